use log::{error, info, warn};
use std::fs;
use std::path::Path;

use crate::config::Source;
use crate::settings::Settings;
use crate::variant::{IconSource, IconStrategy, Variant};

/// Run all boot checks before the page is built.
/// Creates missing output/preference directories, warns about inputs that
/// will degrade the page, and fails if nothing can be written.
pub fn run(settings: &Settings, variant: &Variant, icon_source: IconSource) -> Result<(), String> {
    info!("Linkpage boot check starting ({} preset)...", variant.name);

    let mut warnings = 0u32;
    let mut errors = 0u32;

    // ── 1. Directories ─────────────────────────────────
    for file in [settings.output(), settings.prefs()] {
        let Some(dir) = file.parent().filter(|d| !d.as_os_str().is_empty()) else {
            continue;
        };
        if !dir.exists() {
            match fs::create_dir_all(dir) {
                Ok(_) => info!("  Created directory: {}", dir.display()),
                Err(e) => {
                    error!("  FAILED to create directory {}: {}", dir.display(), e);
                    errors += 1;
                }
            }
        }
    }

    // ── 2. Output directory writable ────────────────────
    let out_dir = settings
        .output()
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Path::new(".").to_path_buf());
    if out_dir.exists() {
        let test_file = out_dir.join(".write_test");
        match fs::write(&test_file, "test") {
            Ok(_) => {
                let _ = fs::remove_file(&test_file);
            }
            Err(e) => {
                error!("  Output directory not writable: {}", e);
                errors += 1;
            }
        }
    }

    // ── 3. Config document ──────────────────────────────
    if let Source::Path(path) = settings.source(variant) {
        if !path.exists() {
            warn!(
                "  Config file not found: {} (the default profile will be shown)",
                path.display()
            );
            warnings += 1;
        }
    }

    // ── 4. Local icons ──────────────────────────────────
    if variant.icons == IconStrategy::RemoteSvg && icon_source == IconSource::Local {
        let dir = settings.icon_dir();
        if !dir.is_dir() {
            warn!(
                "  Icon directory missing: {} (links will show letter badges)",
                dir.display()
            );
            warnings += 1;
        }
    }

    // ── Summary ─────────────────────────────────────────
    if errors > 0 {
        error!(
            "Boot check FAILED: {} error(s), {} warning(s). Aborting.",
            errors, warnings
        );
        return Err(format!("boot check failed with {} error(s)", errors));
    }

    if warnings > 0 {
        warn!(
            "Boot check passed with {} warning(s). The page may render with defaults.",
            warnings
        );
    } else {
        info!("Boot check passed.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::file::tests::temp_path;
    use crate::variant::{CLASSIC, PANEL};

    #[test]
    fn test_creates_missing_directories() {
        let root = temp_path("boot");
        let settings = Settings {
            output: Some(root.join("site/index.html")),
            prefs: Some(root.join("state/prefs.json")),
            config: Some(root.join("data.json").to_string_lossy().into_owned()),
            ..Default::default()
        };
        run(&settings, &CLASSIC, IconSource::Cdn).unwrap();
        assert!(root.join("site").is_dir());
        assert!(root.join("state").is_dir());
        assert!(!root.join("site/.write_test").exists());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_missing_inputs_only_warn() {
        let root = temp_path("boot-warn");
        let settings = Settings {
            output: Some(root.join("index.html")),
            prefs: Some(root.join("prefs.json")),
            icon_dir: Some(root.join("no-icons")),
            ..Default::default()
        };
        assert!(run(&settings, &PANEL, IconSource::Local).is_ok());
        let _ = fs::remove_dir_all(&root);
    }
}
