//! CLI argument parsing.

mod args;

pub use args::{AdminCommand, Args, Command, PlayKind, StatusArg, VoicesCommand};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AccountStatus;
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let args = Args::parse_from([
            "speechix", "generate", "-t", "Hello world", "--voice", "v1", "--timeout", "30",
        ]);

        match args.command {
            Command::Generate {
                text,
                voice,
                language,
                timeout,
                output,
            } => {
                assert_eq!(text, "Hello world");
                assert_eq!(voice.as_deref(), Some("v1"));
                assert_eq!(language, "en");
                assert_eq!(timeout, Some(30));
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let args = Args::parse_from([
            "speechix",
            "dashboard",
            "--api-url",
            "https://speechix.example",
            "-v",
        ]);

        assert!(args.verbose);
        assert_eq!(args.api_url.as_deref(), Some("https://speechix.example"));
        assert!(matches!(args.command, Command::Dashboard));
    }

    #[test]
    fn test_parse_voices_upload() {
        let args = Args::parse_from(["speechix", "voices", "upload", "sample.wav"]);

        match args.command {
            Command::Voices {
                command: VoicesCommand::Upload { file },
            } => assert_eq!(file, PathBuf::from("sample.wav")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_admin_update() {
        let args = Args::parse_from([
            "speechix", "admin", "update", "u1", "--credits", "500", "--status", "disabled",
        ]);

        match args.command {
            Command::Admin {
                command:
                    AdminCommand::Update {
                        id,
                        credits,
                        expiry,
                        status,
                    },
            } => {
                assert_eq!(id, "u1");
                assert_eq!(credits.as_deref(), Some("500"));
                assert!(expiry.is_none());
                assert_eq!(status.map(AccountStatus::from), Some(AccountStatus::Disabled));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_play() {
        let args = Args::parse_from(["speechix", "play", "history", "h1"]);

        match args.command {
            Command::Play { kind, id } => {
                assert_eq!(kind, PlayKind::History);
                assert_eq!(id, "h1");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_login_requires_email() {
        let result = Args::try_parse_from(["speechix", "login", "--password", "secret1"]);
        assert!(result.is_err());
    }
}
