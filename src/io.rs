use std::fs;
use std::path::Path;

use log::warn;

use crate::constants::*;
use crate::error::SimError;
use crate::process::ProcessDescriptor;

/// Parse one process description, e.g.
///
/// ```text
/// name: Process1;
/// page: 1;
/// page: 2;
/// end;
/// ```
///
/// `source` only labels errors.
pub fn parse_process(content: &str, id: Pid, source: &str) -> Result<ProcessDescriptor, SimError> {
    let malformed = |reason: String| SimError::MalformedDescriptor {
        source: source.to_string(),
        reason,
    };

    let joined = content.lines().collect::<Vec<_>>().join(" ");
    let mut name: Option<String> = None;
    let mut pages = Vec::new();

    for part in joined.split(';') {
        let part = part.trim();
        if let Some(rest) = part.strip_prefix("name:") {
            name = Some(rest.trim().to_string());
        } else if let Some(rest) = part.strip_prefix("page:") {
            let page: Page = rest
                .trim()
                .parse()
                .map_err(|_| malformed(format!("Invalid page number: {}", rest.trim())))?;
            pages.push(page);
        } else if part.eq_ignore_ascii_case("end") {
            break;
        }
    }

    let name = match name {
        Some(name) if !name.is_empty() => name,
        _ => return Err(malformed("missing process name".to_string())),
    };

    ProcessDescriptor::new(id, name, pages)
}

pub fn read_process<P: AsRef<Path>>(path: P, id: Pid) -> Result<ProcessDescriptor, SimError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| SimError::Io {
        path: path.display().to_string(),
        message: format!("Failed to read process file: {}", e),
    })?;
    parse_process(&content, id, &path.display().to_string())
}

/// Outcome of loading every process file given on the command line.
#[derive(Debug, Default)]
pub struct LoadedProcesses {
    pub descriptors: Vec<ProcessDescriptor>,
    /// Files that were left out, with the reason
    pub excluded: Vec<SimError>,
}

/// Read each file in order, handing out ids from 1. A file that fails to
/// load still uses up its id and is reported in `excluded`. A file over
/// the page limit rejects the whole configuration instead.
pub fn load_processes<P: AsRef<Path>>(paths: &[P]) -> Result<LoadedProcesses, SimError> {
    let mut loaded = LoadedProcesses::default();
    for (i, path) in paths.iter().enumerate() {
        let id = FIRST_PROCESS_ID + i as Pid;
        match read_process(path, id) {
            Ok(desc) => loaded.descriptors.push(desc),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("{}; this process will not be included in the simulation", e);
                loaded.excluded.push(e);
            }
        }
    }
    Ok(loaded)
}

pub fn write_results<P: AsRef<Path>>(path: P, content: &str) -> Result<(), SimError> {
    let path = path.as_ref();
    fs::write(path, content).map_err(|e| SimError::Io {
        path: path.display().to_string(),
        message: format!("Failed to write output file: {}", e),
    })
}
