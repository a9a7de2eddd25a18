use std::{fs, io};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};
use regex::Regex;

/// Reads one label per line, skipping blank lines.
pub(crate) fn file_to_vec<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
    let file_in = fs::File::open(filename)?;
    let file_reader = BufReader::new(file_in);
    let mut labels = Vec::new();
    for line in file_reader.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            labels.push(line.to_string());
        }
    }
    Ok(labels)
}

/// Logs the total elapsed time and the time spent in `l_step`, returns the
/// new total so the caller can feed it back in as `prev` for the next step.
pub(crate) fn trace(l_type: &str, l_step: &str, start: Instant, prev: Duration) -> Duration {
    let total = start.elapsed();
    log::trace!("{} | Total={:.2?} | {}={:.2?}", l_type, total, l_step, total.saturating_sub(prev));
    total
}

/// Extracts class names from a model's `names` metadata, e.g.
/// `{0: 'bayam', 1: 'person'}`.
pub(crate) fn parse_names(raw: &str) -> anyhow::Result<Vec<String>> {
    let re = Regex::new(r#"(['"])([-()\w '"]+)(['"])"#)?;
    Ok(re
        .captures_iter(raw)
        .map(|caps| caps[2].to_string())
        .collect())
}
