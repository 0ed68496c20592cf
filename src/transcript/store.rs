//! Atomic single-entry rewrite of the on-disk index file.

use super::index::base_name;
use std::io;
use std::path::Path;

/// Replace the text of every record whose id matches `audio_id`, leaving all
/// other lines (malformed ones included) byte-for-byte intact.
///
/// The new contents go to a temporary sibling which is then renamed over the
/// original, so the file is never observable half-written. When no record
/// matches, the file is left untouched and `Ok(false)` is returned.
pub fn rewrite_entry(path: &Path, audio_id: &str, text: &str) -> io::Result<bool> {
    let contents = std::fs::read_to_string(path)?;

    let mut replaced = false;
    let mut lines: Vec<String> = Vec::new();

    for line in contents.lines() {
        let parts: Vec<&str> = line.split('|').collect();
        if parts.len() == 2 && base_name(parts[0]) == audio_id {
            // Keep the id field verbatim (directory prefix included) so the
            // file stays consistent with whatever wrote it.
            lines.push(format!("{}|{}", parts[0], text));
            replaced = true;
        } else {
            lines.push(line.to_string());
        }
    }

    if !replaced {
        return Ok(false);
    }

    let mut output = lines.join("\n");
    if contents.ends_with('\n') {
        output.push('\n');
    }

    let tmp_path = match path.file_name() {
        Some(name) => path.with_file_name(format!("{}.tmp", name.to_string_lossy())),
        None => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a file path: {}", path.display()),
            ))
        }
    };

    std::fs::write(&tmp_path, output)?;
    std::fs::rename(&tmp_path, path)?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_only_matching_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.txt");
        std::fs::write(&path, "clip1|old\nclip2|keep\n").unwrap();

        let replaced = rewrite_entry(&path, "clip1", "new").unwrap();
        assert!(replaced);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "clip1|new\nclip2|keep\n");
    }

    #[test]
    fn test_no_match_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.txt");
        let original = "clip1|text\n";
        std::fs::write(&path, original).unwrap();

        let replaced = rewrite_entry(&path, "missing", "new").unwrap();
        assert!(!replaced);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_malformed_lines_preserved_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.txt");
        std::fs::write(&path, "a|b|c\nclip1|old\nnoseparator\n").unwrap();

        rewrite_entry(&path, "clip1", "new").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "a|b|c\nclip1|new\nnoseparator\n");
    }

    #[test]
    fn test_matches_on_basename_and_keeps_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.txt");
        std::fs::write(&path, "wavs/clip1|old\n").unwrap();

        let replaced = rewrite_entry(&path, "clip1", "new").unwrap();
        assert!(replaced);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "wavs/clip1|new\n");
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.txt");
        std::fs::write(&path, "clip1|old\n").unwrap();

        rewrite_entry(&path, "clip1", "new").unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("metadata.txt")]);
    }
}
