//! Credential redaction for logged `oras` invocations: a direct port of the
//! reference client's `redact_arguments`.

/// Any argument whose text contains `"password"` is either truncated at its
/// `=` (the remainder replaced by `X`s), or, for the bare `--password
/// <value>` form, the *following* positional argument is replaced wholesale
/// with `X`s of the same length.
pub fn redact_arguments(args: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut redact_next = false;

    for arg in args {
        if redact_next {
            out.push("X".repeat(arg.len()));
            redact_next = false;
            continue;
        }
        if arg.contains("password") {
            if let Some(eq) = arg.find('=') {
                let mut redacted = arg[..=eq].to_string();
                redacted.push_str(&"X".repeat(arg.len() - eq - 1));
                out.push(redacted);
            } else {
                out.push(arg.clone());
                redact_next = true;
            }
        } else {
            out.push(arg.clone());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn redacts_equals_form() {
        let args = v(&["--password=hunter2"]);
        assert_eq!(redact_arguments(&args), v(&["--password=XXXXXXX"]));
    }

    #[test]
    fn redacts_bare_next_positional() {
        let args = v(&["--password", "hunter2", "--username", "bob"]);
        assert_eq!(redact_arguments(&args), v(&["--password", "XXXXXXX", "--username", "bob"]));
    }

    #[test]
    fn leaves_unrelated_args_untouched() {
        let args = v(&["pull", "--output", "/tmp/x", "registry.example/ns/sys/uarch/n/v:t"]);
        assert_eq!(redact_arguments(&args), args);
    }
}
