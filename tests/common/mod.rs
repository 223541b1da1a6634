use std::io::Write;
use tempfile::NamedTempFile;

/// Writes the given lines to a temporary payments file.
pub fn payments_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}

/// `count` payment lines of one unit each in the given currency.
#[allow(dead_code)]
pub fn unit_payments(currency: &str, count: usize) -> String {
    (0..count).map(|_| format!("{currency} 1\n")).collect()
}
