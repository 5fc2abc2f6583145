use anyhow::Result;
use std::io::Write;

use crate::processor::CombinedResult;

/// Write the result as one JSON line followed by a newline
pub fn write_json_line<W: Write>(writer: &mut W, result: &CombinedResult) -> Result<()> {
    serde_json::to_writer(&mut *writer, result)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Print the result to standard output
pub fn print_to_stdout(result: &CombinedResult) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_json_line(&mut handle, result)
}
