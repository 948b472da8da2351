pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Read a typed input record from `--input <file.json>` or piped stdin.
pub fn read_typed<T: DeserializeOwned>(
    path: &Option<String>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_json(path);
    }
    if let Some(data) = stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }
    Err(format!("--input <file.json> or stdin required for {what}").into())
}
