// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Flags always passed to KeYmaera X; more can be added via `keymaera_flags`.
const DEFAULT_KEYMAERA_FLAGS: &[&str] = &["-prove"];

/// KeYmaera X options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeymaeraOptions {
    /// Path to the java executable.
    pub java_exe: String,
    /// Path to the KeYmaera X jar. Without it no obligation is submitted.
    pub keymaera_jar: String,
    /// Additional flags placed before `-prove`.
    pub keymaera_flags: Vec<String>,
    /// A hard timeout per obligation; the prover is killed when it runs longer.
    /// Zero for no timeout.
    pub hard_timeout_secs: u64,
    /// Whether the prover output is kept next to the artifact.
    pub keep_logs: bool,
}

impl Default for KeymaeraOptions {
    fn default() -> Self {
        Self {
            java_exe: read_env_var("JAVA_EXE"),
            keymaera_jar: read_env_var("KEYMAERA_JAR"),
            keymaera_flags: vec![],
            hard_timeout_secs: 60,
            keep_logs: true,
        }
    }
}

fn read_env_var(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

impl KeymaeraOptions {
    pub fn is_configured(&self) -> bool {
        !self.keymaera_jar.is_empty()
    }

    /// Returns command line to call KeYmaera X on `artifact`.
    pub fn get_keymaera_command(&self, artifact: &Path) -> Vec<String> {
        let java = if self.java_exe.is_empty() {
            "java".to_string()
        } else {
            self.java_exe.clone()
        };
        let mut result = vec![java, "-jar".to_string(), self.keymaera_jar.clone()];
        result.extend(self.keymaera_flags.iter().cloned());
        result.extend(DEFAULT_KEYMAERA_FLAGS.iter().map(|f| f.to_string()));
        result.push(artifact.display().to_string());
        result
    }

    /// Returns name of file where to log prover output.
    pub fn get_keymaera_log_file(&self, artifact: &Path) -> String {
        format!("{}.log", artifact.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let options = KeymaeraOptions {
            java_exe: String::new(),
            keymaera_jar: "/opt/keymaerax.jar".to_string(),
            keymaera_flags: vec!["-timeout".to_string(), "30".to_string()],
            ..KeymaeraOptions::default()
        };
        assert_eq!(
            options.get_keymaera_command(Path::new("out/Heater/ctrl.kyx")),
            vec!["java", "-jar", "/opt/keymaerax.jar", "-timeout", "30", "-prove", "out/Heater/ctrl.kyx"]
        );
        assert_eq!(
            options.get_keymaera_log_file(Path::new("out/Heater/ctrl.kyx")),
            "out/Heater/ctrl.kyx.log"
        );
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = toml::from_str::<KeymaeraOptions>("keymaera_jar = \"k.jar\"\nz3_exe = \"z3\"\n").unwrap_err();
        assert!(err.to_string().contains("z3_exe"));
        let options: KeymaeraOptions = toml::from_str("hard_timeout_secs = 5\n").unwrap();
        assert_eq!(options.hard_timeout_secs, 5);
        assert!(options.keep_logs);
    }
}
