// src/bin/gofront.rs
//! Command-line driver.
//!
//! ```text
//! gofront tokens <file.go>   one token per line
//! gofront parse  <file.go>   the syntax tree as an s-expression
//! gofront types  <file.go>   top-level declarations and their types
//! ```
//!
//! Log level comes from `GOFRONT_LOG` (default `warn`), e.g.
//! `GOFRONT_LOG=gofront=debug`.

use std::process::ExitCode;

use gofront::{parse_named, token_listing, ParsedFile, Resolver, TypeTable};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();
    let (Some(command), Some(path)) = (args.get(1), args.get(2)) else {
        print_usage();
        return ExitCode::FAILURE;
    };
    let src = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("error: cannot read {path}: {err}");
            return ExitCode::FAILURE;
        }
    };
    match command.as_str() {
        "tokens" => tokens(path, &src),
        "parse" => parse(path, &src),
        "types" => types(path, &src),
        other => {
            eprintln!("error: unknown command '{other}'");
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("GOFRONT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    eprintln!("Usage: gofront <command> <file.go>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  tokens   Print the token stream, with inserted semicolons");
    eprintln!("  parse    Print the syntax tree");
    eprintln!("  types    Resolve top-level declarations and print their types");
}

fn tokens(path: &str, src: &str) -> ExitCode {
    let (listing, errors) = token_listing(path, src);
    print!("{listing}");
    report(errors.iter())
}

fn parse(path: &str, src: &str) -> ExitCode {
    match parse_named(path, src) {
        Ok(parsed) => {
            println!("{}", parsed.render());
            ExitCode::SUCCESS
        }
        Err(failure) => {
            println!("{}", failure.partial.render());
            report(failure.diags.iter())
        }
    }
}

fn types(path: &str, src: &str) -> ExitCode {
    let (parsed, parse_ok) = match parse_named(path, src) {
        Ok(parsed) => (parsed, true),
        Err(failure) => {
            report(failure.diags.iter());
            (failure.partial, false)
        }
    };
    let table = TypeTable::default();
    let mut resolver = Resolver::new(&table);
    if let Err(err) = resolver.resolve(&parsed) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }
    print_objects(&parsed, &resolver);
    let diags: Vec<_> = resolver.errors().iter().filter_map(|e| e.diagnostic()).collect();
    if !parse_ok {
        report(diags.into_iter());
        return ExitCode::FAILURE;
    }
    report(diags.into_iter())
}

fn print_objects(parsed: &ParsedFile, resolver: &Resolver<'_>) {
    for (node, obj) in resolver.objects().iter() {
        let position = parsed.file.position(parsed.ast.pos(node));
        let ty = obj.ty.as_ref().map_or_else(|| "-".to_string(), |t| t.to_string());
        match &obj.value {
            Some(v) => println!("{position}\t{}\t{}\t{ty} = {}", obj.class, obj.name, v.lit),
            None => println!("{position}\t{}\t{}\t{ty}", obj.class, obj.name),
        }
    }
}

fn report<'a>(errors: impl Iterator<Item = &'a gofront::syntax::Error>) -> ExitCode {
    let mut failed = false;
    for err in errors {
        eprintln!("{err}");
        failed = true;
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
