//! Command sanitization.
//!
//! Two checks run over every command before execution: a deny list of shell
//! metacharacters across the program and every argument, then an allow list
//! over the program token. Execution itself never touches a shell (see
//! [`crate::process`]); the deny list is a secondary defense and a known
//! incomplete one, so a trip here is logged as a possible attack signal.

use crate::invoker::CommandSpec;
use crate::ExecutorError;

/// Shell metacharacters rejected anywhere in a command's tokens.
pub const DENIED_CHARACTERS: &[char] = &[
    ';', '&', '|', '`', '$', '(', ')', '{', '}', '[', ']', '<', '>', '"', '\'',
];

/// External programs the invoker may launch.
pub const ALLOWED_PROGRAMS: &[&str] = &["npm", "npx", "hardhat", "aptos"];

/// Validate a command immediately before execution.
///
/// # Errors
/// Returns [`ExecutorError::DangerousInput`] for a deny-listed character in
/// any token, then [`ExecutorError::CommandNotAllowed`] for a program
/// outside the allow list.
pub fn sanitize(spec: &CommandSpec) -> Result<(), ExecutorError> {
    let tokens = std::iter::once(spec.program.as_str()).chain(spec.args.iter().map(String::as_str));
    for token in tokens {
        if let Some(character) = token.chars().find(|c| DENIED_CHARACTERS.contains(c)) {
            return Err(ExecutorError::DangerousInput { character });
        }
    }

    if !ALLOWED_PROGRAMS.contains(&spec.program.as_str()) {
        return Err(ExecutorError::CommandNotAllowed { program: spec.program.clone() });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::StepName;

    fn spec(program: &str, args: &[&str]) -> CommandSpec {
        CommandSpec::new(StepName::Compile, program, args.iter().copied())
    }

    #[test]
    fn clean_commands_pass() {
        assert!(sanitize(&spec("npm", &["install"])).is_ok());
        assert!(sanitize(&spec("npx", &["hardhat", "run", "scripts/deploy.ts"])).is_ok());
        assert!(sanitize(&spec("aptos", &["move", "compile", "--package-dir", "contracts/counter"])).is_ok());
    }

    #[test]
    fn every_denied_character_is_rejected_for_every_allowed_program() {
        for program in ALLOWED_PROGRAMS {
            for &character in DENIED_CHARACTERS {
                let poisoned = format!("run{character}away");
                let result = sanitize(&spec(program, &[poisoned.as_str()]));
                assert!(
                    matches!(result, Err(ExecutorError::DangerousInput { character: c }) if c == character),
                    "{program} with {character:?} must trip the deny list"
                );
            }
        }
    }

    #[test]
    fn denied_character_in_program_token_is_rejected() {
        let result = sanitize(&spec("npm|cat", &[]));
        assert!(matches!(result, Err(ExecutorError::DangerousInput { character: '|' })));
    }

    #[test]
    fn unlisted_program_is_rejected() {
        let result = sanitize(&spec("curl", &["https://devnet.example"]));
        assert!(
            matches!(result, Err(ExecutorError::CommandNotAllowed { ref program }) if program == "curl")
        );
    }

    #[test]
    fn deny_list_is_checked_before_allow_list() {
        // A disallowed program with a dangerous argument reports the
        // character, matching the fixed check order.
        let result = sanitize(&spec("curl", &["$(reboot)"]));
        assert!(matches!(result, Err(ExecutorError::DangerousInput { .. })));
    }

    proptest::proptest! {
        #[test]
        fn proptest_args_with_denied_chars_never_pass(
            prefix in "[a-z0-9./-]{0,16}",
            suffix in "[a-z0-9./-]{0,16}",
            index in 0usize..15,
        ) {
            let character = DENIED_CHARACTERS[index];
            let arg = format!("{prefix}{character}{suffix}");
            let result = sanitize(&spec("npm", &[arg.as_str()]));
            let is_dangerous = matches!(result, Err(ExecutorError::DangerousInput { .. }));
            proptest::prop_assert!(is_dangerous);
        }

        #[test]
        fn proptest_clean_alphanumeric_args_pass(arg in "[a-zA-Z0-9_./=-]{1,32}") {
            let result = sanitize(&spec("npm", &[arg.as_str()]));
            proptest::prop_assert!(result.is_ok());
        }
    }
}
