use clap::Parser;
use md5db::tooling::cli::{Cli, Commands};
use md5db::types::{AlterMode, ExportFormat};

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["md5db", "build", "usb", "/mnt/usb"],
        vec!["md5db", "build", "usb", "/mnt/usb", "--skip", ".git", "--skip", "target"],
        vec!["md5db", "add", "usb", "a.txt", "b.txt"],
        vec!["md5db", "query", "contain", "path", "photos"],
        vec!["md5db", "query", "startwith", "md5", "d41d"],
        vec!["md5db", "query", "lt", "size", "100", "--sort", "size", "--desc"],
        vec!["md5db", "query", "regex", "time", "2024-.*", "--limit", "0"],
        vec!["md5db", "concat", "all.fmd", "a.fmd", "b.fmd"],
        vec!["md5db", "export", "out.csv"],
        vec!["md5db", "export", "out.json", "--format", "json"],
        vec!["md5db", "alter", "device-name", "backup"],
        vec!["md5db", "alter", "DriveLetter", "E"],
        vec!["md5db", "shell"],
        vec!["md5db", "conflicts"],
        vec!["md5db", "--store", "s.fmd", "--log-output", "file", "shell"],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_invalid_arguments() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["md5db", "add", "usb"],
        vec!["md5db", "concat", "all.fmd"],
        vec!["md5db", "query", "contain", "owner", "x"],
        vec!["md5db", "export", "out.xml", "--format", "xml"],
        vec!["md5db", "alter", "rename", "x"],
        vec!["md5db", "shell", "--log-level", "chatty"],
    ];

    for args in cases {
        assert!(
            Cli::try_parse_from(args.clone()).is_err(),
            "expected parse failure for args: {args:?}"
        );
    }
}

#[test]
fn parse_enum_arguments() {
    let cli = Cli::try_parse_from(["md5db", "export", "x.json", "--format", "JSON"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Export {
            format: ExportFormat::Json,
            ..
        }
    ));

    let cli = Cli::try_parse_from(["md5db", "alter", "drive-letter", "F"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Alter {
            mode: AlterMode::DriveLetter,
            ..
        }
    ));
}
