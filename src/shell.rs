//! Shell detection for the `run` subcommand's final exec step.

use std::path::PathBuf;

/// Reads `$SHELL`, falling back to `/bin/sh`.
pub fn current_shell(getenv: impl Fn(&str) -> Option<String>) -> PathBuf {
    getenv("SHELL")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/bin/sh"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_shell_env_var() {
        let p = current_shell(|k| if k == "SHELL" { Some("/bin/zsh".to_string()) } else { None });
        assert_eq!(p, PathBuf::from("/bin/zsh"));
    }

    #[test]
    fn falls_back_to_bin_sh() {
        let p = current_shell(|_| None);
        assert_eq!(p, PathBuf::from("/bin/sh"));
    }
}
