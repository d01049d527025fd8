use std::fs;
use std::path::Path;

use crate::error::Result;

/// Reads a whole text file and splits it into lines.
///
/// `\n` and `\r\n` endings are both accepted; line terminators are dropped.
pub(crate) fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
	let contents = fs::read_to_string(path)?;
	Ok(contents.lines().map(str::to_owned).collect())
}
