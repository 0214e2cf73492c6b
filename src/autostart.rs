//! OS autostart registration
//!
//! One implementation per platform: a LaunchAgent plist on macOS, an
//! HKCU Run key on Windows, an XDG autostart entry on Linux. The
//! registration lives with the OS, not the settings file, and the two
//! can disagree when a call here fails.

use anyhow::Result;

/// Launch-at-login registration for the current user.
pub trait Autostart {
    /// Whether a registration for this application currently exists.
    fn is_enabled(&self) -> bool;

    /// Register the current executable. Idempotent.
    fn enable(&self) -> Result<()>;

    /// Remove the registration. Removing an absent registration
    /// succeeds.
    fn disable(&self) -> Result<()>;
}

/// Get the registration mechanism for the platform this was built for.
pub fn platform_autostart() -> Box<dyn Autostart> {
    #[cfg(target_os = "macos")]
    return Box::new(macos::LaunchAgent);

    #[cfg(target_os = "windows")]
    return Box::new(windows::RunKey);

    #[cfg(target_os = "linux")]
    return Box::new(linux::XdgAutostart);

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    Box::new(Unsupported)
}

#[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
struct Unsupported;

#[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
impl Autostart for Unsupported {
    fn is_enabled(&self) -> bool {
        false
    }

    fn enable(&self) -> Result<()> {
        anyhow::bail!("Launch at startup is not supported on this platform")
    }

    fn disable(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(target_os = "macos")]
mod macos {
    use super::Autostart;
    use anyhow::{Context, Result};
    use std::fs;
    use std::path::{Path, PathBuf};

    const BUNDLE_ID: &str = "com.task-manager.app";

    pub(super) struct LaunchAgent;

    fn plist_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home
            .join("Library")
            .join("LaunchAgents")
            .join(format!("{}.plist", BUNDLE_ID)))
    }

    fn plist_content(executable: &Path) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{bundle_id}</string>
    <key>ProgramArguments</key>
    <array>
        <string>{executable}</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
</dict>
</plist>
"#,
            bundle_id = BUNDLE_ID,
            executable = executable.display()
        )
    }

    impl Autostart for LaunchAgent {
        fn is_enabled(&self) -> bool {
            plist_path().map(|path| path.exists()).unwrap_or(false)
        }

        fn enable(&self) -> Result<()> {
            let plist_path = plist_path()?;
            let executable = std::env::current_exe()
                .context("Could not determine current executable path")?;

            if let Some(parent) = plist_path.parent() {
                fs::create_dir_all(parent)
                    .context("Failed to create LaunchAgents directory")?;
            }

            fs::write(&plist_path, plist_content(&executable))
                .context("Failed to write LaunchAgent plist file")?;

            tracing::info!("Autostart enabled: created LaunchAgent at {:?}", plist_path);
            Ok(())
        }

        fn disable(&self) -> Result<()> {
            let plist_path = plist_path()?;

            if plist_path.exists() {
                fs::remove_file(&plist_path)
                    .context("Failed to remove LaunchAgent plist file")?;
                tracing::info!(
                    "Autostart disabled: removed LaunchAgent at {:?}",
                    plist_path
                );
            }

            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::plist_content;
        use std::path::Path;

        #[test]
        fn plist_runs_the_executable_at_load() {
            let content =
                plist_content(Path::new("/Applications/Task Manager.app/Contents/MacOS/task-manager"));
            assert!(content.contains("<key>RunAtLoad</key>"));
            assert!(content.contains("/Applications/Task Manager.app/Contents/MacOS/task-manager"));
            assert!(content.contains("com.task-manager.app"));
        }
    }
}

#[cfg(target_os = "windows")]
mod windows {
    use super::Autostart;
    use anyhow::{Context, Result};
    use winreg::enums::HKEY_CURRENT_USER;
    use winreg::RegKey;

    const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";
    const VALUE_NAME: &str = "TaskManager";

    pub(super) struct RunKey;

    impl Autostart for RunKey {
        fn is_enabled(&self) -> bool {
            let Ok(key) = RegKey::predef(HKEY_CURRENT_USER).open_subkey(RUN_KEY) else {
                return false;
            };
            key.get_value::<String, _>(VALUE_NAME).is_ok()
        }

        fn enable(&self) -> Result<()> {
            let executable = std::env::current_exe()
                .context("Could not determine current executable path")?
                .to_string_lossy()
                .to_string();

            let (key, _) = RegKey::predef(HKEY_CURRENT_USER)
                .create_subkey(RUN_KEY)
                .context("Failed to open the Run key")?;
            key.set_value(VALUE_NAME, &executable)
                .context("Failed to write the Run key value")?;

            tracing::info!("Autostart enabled: registered {} in the Run key", VALUE_NAME);
            Ok(())
        }

        fn disable(&self) -> Result<()> {
            let (key, _) = RegKey::predef(HKEY_CURRENT_USER)
                .create_subkey(RUN_KEY)
                .context("Failed to open the Run key")?;
            // An absent value means there is nothing to remove
            let _ = key.delete_value(VALUE_NAME);

            tracing::info!("Autostart disabled: removed {} from the Run key", VALUE_NAME);
            Ok(())
        }
    }
}

#[cfg(target_os = "linux")]
mod linux {
    use super::Autostart;
    use anyhow::{Context, Result};
    use std::fs;
    use std::path::{Path, PathBuf};

    pub(super) struct XdgAutostart;

    fn desktop_path() -> Result<PathBuf> {
        let config = dirs::config_dir().context("Could not find config directory")?;
        Ok(config.join("autostart").join("task-manager.desktop"))
    }

    fn desktop_content(executable: &Path) -> String {
        format!(
            "[Desktop Entry]\n\
             Type=Application\n\
             Name=Task Manager\n\
             Exec={}\n\
             X-GNOME-Autostart-enabled=true\n",
            executable.display()
        )
    }

    impl Autostart for XdgAutostart {
        fn is_enabled(&self) -> bool {
            desktop_path().map(|path| path.exists()).unwrap_or(false)
        }

        fn enable(&self) -> Result<()> {
            let desktop_path = desktop_path()?;
            let executable = std::env::current_exe()
                .context("Could not determine current executable path")?;

            if let Some(parent) = desktop_path.parent() {
                fs::create_dir_all(parent)
                    .context("Failed to create the autostart directory")?;
            }

            fs::write(&desktop_path, desktop_content(&executable))
                .context("Failed to write autostart desktop entry")?;

            tracing::info!("Autostart enabled: created desktop entry at {:?}", desktop_path);
            Ok(())
        }

        fn disable(&self) -> Result<()> {
            let desktop_path = desktop_path()?;

            if desktop_path.exists() {
                fs::remove_file(&desktop_path)
                    .context("Failed to remove autostart desktop entry")?;
                tracing::info!(
                    "Autostart disabled: removed desktop entry at {:?}",
                    desktop_path
                );
            }

            Ok(())
        }
    }

}
