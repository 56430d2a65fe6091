// SPDX-License-Identifier: GPL-3.0-only

//! Output file naming and directory handling

use chrono::Local;
use std::io;
use std::path::{Path, PathBuf};

/// Create the output directory if it does not exist
pub fn ensure_output_dir(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)
}

/// Build the output path for one recording session:
/// `{YYYYmmdd_HHMMSS}_{model}_{mode}.mp4` under `dir`.
///
/// `mode` is the lowercase capture-mode tag. Pass `None` for the mock
/// sensor, which writes `{timestamp}_mock.mp4` without a model part.
pub fn recording_path(dir: &Path, model: Option<&str>, mode: &str) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let filename = match model {
        Some(model) => format!("{}_{}_{}.mp4", timestamp, sanitize_model(model), mode),
        None => format!("{}_{}.mp4", timestamp, mode),
    };
    dir.join(filename)
}

/// Normalize a model identifier for use in a file name
///
/// Dashes become underscores; any other non-alphanumeric character is
/// replaced by an underscore as well.
pub fn sanitize_model(model: &str) -> String {
    model
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_model_dashes() {
        assert_eq!(sanitize_model("oak-d-pro"), "oak_d_pro");
    }

    #[test]
    fn test_sanitize_model_other_characters() {
        assert_eq!(sanitize_model("oak d/pro v2"), "oak_d_pro_v2");
        assert_eq!(sanitize_model("OAK123"), "OAK123");
    }

    #[test]
    fn test_recording_path_shape() {
        let path = recording_path(Path::new("recordings"), Some("oak-d-pro"), "synthetic");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(
            name.ends_with("_oak_d_pro_synthetic.mp4"),
            "unexpected file name: {}",
            name
        );
        // 15-character timestamp prefix: YYYYmmdd_HHMMSS
        assert_eq!(name.as_bytes()[8], b'_');
        assert!(name[..8].bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_recording_path_mock() {
        let path = recording_path(Path::new("recordings"), None, "mock");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("_mock.mp4"), "unexpected file name: {}", name);
    }
}
