use clap::{CommandFactory, Parser};
use stockroom::tooling::cli::Cli;

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["stockroom", "list"],
        vec!["stockroom", "list", "--format", "json"],
        vec!["stockroom", "--root", "/tmp/inv", "stats"],
        vec!["stockroom", "filter", "price", ">100"],
        vec!["stockroom", "filter", "name", "drill", "--format", "json"],
        vec!["stockroom", "show", "some-id"],
        vec!["stockroom", "update", "some-id", "stock", "5"],
        vec!["stockroom", "delete", "some-id", "--yes"],
        vec!["stockroom", "sort", "price", "--descending"],
        vec!["stockroom", "menu"],
        vec![
            "stockroom", "add", "--category", "tools", "--brand", "acme", "--model", "x1",
            "--name", "Hammer", "--price", "9.99", "--stock", "2", "--description", "steel",
        ],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_malformed_numbers() {
    let bad_stock = Cli::try_parse_from([
        "stockroom", "add", "--category", "tools", "--brand", "acme", "--model", "x1",
        "--name", "Hammer", "--price", "9.99", "--stock", "-2",
    ]);
    assert!(bad_stock.is_err());

    let bad_price = Cli::try_parse_from([
        "stockroom", "add", "--category", "tools", "--brand", "acme", "--model", "x1",
        "--name", "Hammer", "--price", "cheap", "--stock", "2",
    ]);
    assert!(bad_price.is_err());

    assert!(Cli::try_parse_from(["stockroom", "filter", "price"]).is_err());
}

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}
