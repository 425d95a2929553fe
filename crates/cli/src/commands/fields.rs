// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use field_selection::{
    FieldsOptions, QueryContext, env::Environment, field_list, field_map, field_projection,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::commands::command::{CommandDefinition, get, get_required, output_arg, query_file_arg};

#[derive(Clone, Copy, Debug)]
pub(crate) enum Output {
    Map,
    List,
    Projection,
}

impl Output {
    fn name(self) -> &'static str {
        match self {
            Output::Map => "map",
            Output::List => "list",
            Output::Projection => "projection",
        }
    }

    fn about(self) -> &'static str {
        match self {
            Output::Map => "Print the requested fields as a nested map",
            Output::List => "Print the names of the requested fields",
            Output::Projection => "Print the requested fields as dot-notation paths",
        }
    }
}

pub(crate) struct FieldsCommandDefinition {
    output: Output,
}

impl FieldsCommandDefinition {
    pub(crate) fn new(output: Output) -> Self {
        Self { output }
    }

    fn render(
        &self,
        query: &str,
        field: &str,
        operation_name: Option<&str>,
        variables: Option<Map<String, Value>>,
        options: &FieldsOptions,
    ) -> Result<String> {
        let context = QueryContext::new(query, operation_name, variables)?;
        let info = context.resolve_info(field)?;

        let rendered = match self.output {
            Output::Map => serde_json::to_string_pretty(&field_map(&info, options))?,
            Output::List => serde_json::to_string_pretty(&field_list(&info, options))?,
            Output::Projection => {
                serde_json::to_string_pretty(&field_projection(&info, options))?
            }
        };
        Ok(rendered)
    }
}

impl CommandDefinition for FieldsCommandDefinition {
    fn command(&self) -> Command {
        Command::new(self.output.name())
            .about(self.output.about())
            .arg(query_file_arg())
            .arg(
                Arg::new("field")
                    .help("Response path of the resolved field, such as `viewer.posts`")
                    .short('f')
                    .long("field")
                    .required(true)
                    .num_args(1),
            )
            .arg(
                Arg::new("operation")
                    .help("Name of the operation to use when the document has several")
                    .long("operation")
                    .required(false)
                    .num_args(1),
            )
            .arg(
                Arg::new("variables")
                    .help("Operation variables as a JSON object")
                    .long("variables")
                    .required(false)
                    .num_args(1),
            )
            .arg(
                Arg::new("options")
                    .help("Field selection options as JSON")
                    .long_help(
                        "Field selection options as JSON, such as `{\"skip\": [\"secret\"]}`. \
                        If not specified, options are read from the environment (`FIELDSEL_PATH`, \
                        `FIELDSEL_SKIP`, `FIELDSEL_WITH_DIRECTIVES`, `FIELDSEL_KEEP_PARENT_FIELD`). \
                        The flags below take precedence either way.",
                    )
                    .long("options")
                    .required(false)
                    .num_args(1),
            )
            .arg(
                Arg::new("path")
                    .help("Only report the branch at this dot-separated path")
                    .long("path")
                    .required(false)
                    .num_args(1),
            )
            .arg(
                Arg::new("skip")
                    .help("Leave out fields matching this pattern (repeatable, `*` wildcards)")
                    .long("skip")
                    .required(false)
                    .action(ArgAction::Append)
                    .num_args(1),
            )
            .arg(
                Arg::new("keep-parent-field")
                    .help("Also list intermediate paths in projections")
                    .long("keep-parent-field")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("no-directives")
                    .help("Ignore @skip and @include")
                    .long("no-directives")
                    .action(ArgAction::SetTrue),
            )
            .arg(output_arg())
    }

    fn execute(&self, matches: &ArgMatches, env: &dyn Environment) -> Result<()> {
        let query_path: PathBuf = get_required(matches, "query")?;
        let query = fs::read_to_string(&query_path)
            .with_context(|| format!("Failed to read {}", query_path.display()))?;

        let field: String = get_required(matches, "field")?;
        let operation_name: Option<String> = get(matches, "operation");
        let variables = get::<String>(matches, "variables")
            .map(|variables| parse_variables(&variables))
            .transpose()?;
        let options = options_from_matches(matches, env)?;
        debug!(?options, "field selection options");

        let rendered = self.render(
            &query,
            &field,
            operation_name.as_deref(),
            variables,
            &options,
        )?;

        match get::<PathBuf>(matches, "output") {
            Some(output) => fs::write(&output, format!("{rendered}\n"))
                .with_context(|| format!("Failed to write {}", output.display()))?,
            None => println!("{rendered}"),
        }

        Ok(())
    }
}

fn parse_variables(variables: &str) -> Result<Map<String, Value>> {
    serde_json::from_str(variables).context("Variables must be a JSON object")
}

fn options_from_matches(matches: &ArgMatches, env: &dyn Environment) -> Result<FieldsOptions> {
    let mut options = match get::<String>(matches, "options") {
        Some(json) => FieldsOptions::from_json(&json)?,
        None => FieldsOptions::from_env(env)?,
    };

    if let Some(path) = get::<String>(matches, "path") {
        options = options.with_path(path);
    }
    if let Some(patterns) = matches.get_many::<String>("skip") {
        options = options.with_skip(patterns.cloned());
    }
    if matches.get_flag("keep-parent-field") {
        options = options.keep_parent_field(true);
    }
    if matches.get_flag("no-directives") {
        options = options.with_directives(false);
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    use field_selection::env::{FIELDSEL_SKIP, MapEnvironment};
    use serde_json::json;

    const QUERY: &str = r#"
        query Viewer($full: Boolean = false) {
            viewer {
                name
                email @include(if: $full)
                posts { title body }
            }
        }
    "#;

    fn matches(output: Output, args: &[&str]) -> ArgMatches {
        let name = output.name();
        FieldsCommandDefinition::new(output)
            .command()
            .try_get_matches_from(std::iter::once(name).chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn flags_override_environment() {
        let env = MapEnvironment::from([(FIELDSEL_SKIP, "secret")]);
        let matches = matches(
            Output::Map,
            &[
                "query.graphql",
                "--field",
                "viewer",
                "--skip",
                "a.b",
                "--skip",
                "c",
                "--no-directives",
            ],
        );
        let options = options_from_matches(&matches, &env).unwrap();

        assert_eq!(options.skip, vec!["secret", "a.b", "c"]);
        assert!(!options.with_directives);
        assert!(!options.keep_parent_field);
    }

    #[test]
    fn json_options_replace_environment() {
        let env = MapEnvironment::from([(FIELDSEL_SKIP, "secret")]);
        let matches = matches(
            Output::Projection,
            &[
                "query.graphql",
                "-f",
                "viewer",
                "--options",
                r#"{ "path": "posts" }"#,
                "--keep-parent-field",
            ],
        );
        let options = options_from_matches(&matches, &env).unwrap();

        assert_eq!(options.path.as_deref(), Some("posts"));
        assert!(options.skip.is_empty());
        assert!(options.keep_parent_field);
    }

    #[test]
    fn field_is_required() {
        let result = FieldsCommandDefinition::new(Output::List)
            .command()
            .try_get_matches_from(["list", "query.graphql"]);
        assert!(result.is_err());
    }

    #[test]
    fn render_each_output() {
        let variables = parse_variables(r#"{ "full": true }"#).unwrap();
        let options = FieldsOptions::default().with_skip(["posts.body"]);

        let map = FieldsCommandDefinition::new(Output::Map)
            .render(QUERY, "viewer", None, Some(variables.clone()), &options)
            .unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&map).unwrap(),
            json!({ "name": false, "email": false, "posts": { "title": false } })
        );

        let list = FieldsCommandDefinition::new(Output::List)
            .render(QUERY, "viewer", None, None, &options)
            .unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&list).unwrap(),
            json!(["name", "posts"])
        );

        let projection = FieldsCommandDefinition::new(Output::Projection)
            .render(QUERY, "viewer", Some("Viewer"), Some(variables), &options)
            .unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&projection).unwrap(),
            json!({ "name": 1, "email": 1, "posts.title": 1 })
        );
    }

    #[test]
    fn unknown_field_is_an_error() {
        let result = FieldsCommandDefinition::new(Output::Map).render(
            QUERY,
            "viewer.friends",
            None,
            None,
            &FieldsOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn execute_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let query_path = dir.path().join("query.graphql");
        let output_path = dir.path().join("fields.json");
        fs::write(&query_path, QUERY).unwrap();

        let matches = matches(
            Output::List,
            &[
                query_path.to_str().unwrap(),
                "--field",
                "viewer",
                "--path",
                "posts",
                "--output",
                output_path.to_str().unwrap(),
            ],
        );
        FieldsCommandDefinition::new(Output::List)
            .execute(&matches, &MapEnvironment::default())
            .unwrap();

        let written: Value =
            serde_json::from_str(&fs::read_to_string(output_path).unwrap()).unwrap();
        assert_eq!(written, json!(["title", "body"]));
    }
}
