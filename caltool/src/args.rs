//! Command line parsing.
//!
//! The flags are single-dash words (`-info`, `-filter`) followed by
//! positional keywords, so they are matched by hand.

use std::path::PathBuf;

use anyhow::{Result, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractKind {
    Events,
    XProps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Events,
    Todos,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Info,
    Extract(ExtractKind),
    Filter {
        kind: FilterKind,
        from: Option<String>,
        to: Option<String>,
    },
    Combine(PathBuf),
}

fn reject_extra(rest: &[String]) -> Result<()> {
    if rest.is_empty() {
        return Ok(());
    }
    let quoted: Vec<String> = rest.iter().map(|a| format!("'{a}'")).collect();
    bail!("ERROR: invalid argument(s): {}", quoted.join(""))
}

/// Parse the arguments after the program name.
pub fn parse(args: &[String]) -> Result<Command> {
    let Some((flag, rest)) = args.split_first() else {
        bail!("ERROR: no arguments. Expected -info, -extract, -filter or -combine");
    };

    match flag.as_str() {
        "-info" => {
            reject_extra(rest)?;
            Ok(Command::Info)
        }
        "-extract" => {
            let kind = match rest.first().map(String::as_str) {
                Some("e") => ExtractKind::Events,
                Some("x") => ExtractKind::XProps,
                Some(other) => bail!("ERROR: '{other}' invalid argument for -extract."),
                None => bail!("ERROR: -extract requires 'e' or 'x'."),
            };
            reject_extra(&rest[1..])?;
            Ok(Command::Extract(kind))
        }
        "-filter" => parse_filter(rest),
        "-combine" => match rest {
            [path] => Ok(Command::Combine(PathBuf::from(path))),
            _ => bail!("ERROR: Syntax is '-combine fileName'"),
        },
        other => bail!("ERROR: '{other}' is not a valid argument"),
    }
}

fn parse_filter(rest: &[String]) -> Result<Command> {
    let kind = match rest.first().map(String::as_str) {
        Some("e") => FilterKind::Events,
        Some("t") => FilterKind::Todos,
        Some(other) => bail!("ERROR: '{other}' invalid argument for -filter."),
        None => bail!(
            "ERROR: -filter requires an additional argument. Try '-filter e from \"date\" to \"date\"' or '-filter t from \"date\" to \"date\"'"
        ),
    };

    let mut from = None;
    let mut to = None;
    let mut words = rest[1..].iter();

    while let Some(word) = words.next() {
        match word.as_str() {
            "from" if from.is_none() && to.is_none() => match words.next() {
                Some(value) => from = Some(value.clone()),
                None => bail!("ERROR: invalid argument. Syntax is 'from \"date\"'"),
            },
            "to" if to.is_none() => match words.next() {
                Some(value) => to = Some(value.clone()),
                None => bail!("ERROR: invalid argument. Syntax is 'to \"date\"'"),
            },
            "from" => bail!("ERROR: 'from \"date\"' argument must occur first"),
            other => bail!("ERROR: unexpected argument '{other}'"),
        }
    }

    Ok(Command::Filter { kind, from, to })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &[&str]) -> Vec<String> {
        s.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!(parse(&args(&["-info"])).unwrap(), Command::Info);
        assert_eq!(
            parse(&args(&["-extract", "x"])).unwrap(),
            Command::Extract(ExtractKind::XProps)
        );
        assert_eq!(
            parse(&args(&["-combine", "other.ics"])).unwrap(),
            Command::Combine(PathBuf::from("other.ics"))
        );
    }

    #[test]
    fn test_parse_filter_bounds() {
        assert_eq!(
            parse(&args(&["-filter", "t", "from", "today", "to", "2016-05-01"])).unwrap(),
            Command::Filter {
                kind: FilterKind::Todos,
                from: Some("today".into()),
                to: Some("2016-05-01".into()),
            }
        );
        assert_eq!(
            parse(&args(&["-filter", "e", "to", "2016-05-01"])).unwrap(),
            Command::Filter {
                kind: FilterKind::Events,
                from: None,
                to: Some("2016-05-01".into()),
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&[]).is_err());
        assert!(parse(&args(&["-info", "extra"])).is_err());
        assert!(parse(&args(&["-extract", "q"])).is_err());
        assert!(parse(&args(&["-filter", "e", "from"])).is_err());

        let err = parse(&args(&["-filter", "e", "to", "x", "from", "y"])).unwrap_err();
        assert!(err.to_string().contains("must occur first"));
    }
}
