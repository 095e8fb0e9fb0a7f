//! Generator for `codegen/helpers`: accessors over `GetEventsResponse`
//! that switch on the concrete event type.

use tetragon_codegen::codegen::{api_ident, fmt_errorf, logger, new_generated_file};
use tetragon_codegen::events::{ANCHOR_MESSAGE, VARIANT_PREFIX};
use tetragon_codegen::{
    discover_events, is_parent_event, is_process_event, Config, File, GeneratedFile, Message,
    Result,
};

pub fn generate(file: &File<'_>, config: &Config) -> Result<Vec<GeneratedFile>> {
    let events = discover_events(file)?;
    tracing::info!(file = file.name(), events = events.len(), "Generating helpers");

    let mut g = new_generated_file(file, "helpers", config);
    generate_response_type_string(&mut g, config, &events);
    generate_response_get_field(&mut g, config, &events, "Process", is_process_event);
    generate_response_get_field(&mut g, config, &events, "Parent", is_parent_event);

    Ok(vec![g])
}

fn generate_response_type_string(g: &mut GeneratedFile, config: &Config, events: &[&Message<'_>]) {
    let response = api_ident(g, config, ANCHOR_MESSAGE);
    let nil_response = fmt_errorf(g, "Response is nil", &[]);
    let nil_event = fmt_errorf(g, "Event is nil", &[]);
    let unhandled = fmt_errorf(g, "Unhandled response type %T", &["event"]);

    g.p("// ResponseTypeString returns an event's type as a string");
    g.p(format!("func ResponseTypeString(response *{response}) (string, error) {{"));
    g.p("\tif response == nil {");
    g.p(format!("\t\treturn \"\", {nil_response}"));
    g.p("\t}");
    g.p("");
    g.p("\tevent := response.Event");
    g.p("\tif event == nil {");
    g.p(format!("\t\treturn \"\", {nil_event}"));
    g.p("\t}");
    g.p("");
    g.p("\tswitch event.(type) {");
    for msg in events {
        let wrapper = api_ident(g, config, &format!("{VARIANT_PREFIX}{}", msg.name()));
        g.p(format!("\tcase *{wrapper}:"));
        g.p(format!("\t\treturn {:?}, nil", msg.name()));
    }
    g.p("\t}");
    g.p(format!("\treturn \"\", {unhandled}"));
    g.p("}");
    g.p("");
}

/// Emits `ResponseGet<field>`, returning the named field of every event
/// matching `has`.
fn generate_response_get_field(
    g: &mut GeneratedFile,
    config: &Config,
    events: &[&Message<'_>],
    field: &str,
    has: fn(&Message<'_>) -> bool,
) {
    let response = api_ident(g, config, ANCHOR_MESSAGE);
    let process = api_ident(g, config, "Process");
    let func = format!("ResponseGet{field}");

    g.p(format!(
        "// {func} returns a GetEventsResponse's {} if it exists",
        field.to_lowercase()
    ));
    g.p(format!("func {func}(response *{response}) *{process} {{"));
    g.p("\tif response == nil {");
    g.p("\t\treturn nil");
    g.p("\t}");
    g.p("");

    let matching: Vec<_> = events.iter().filter(|msg| has(msg)).collect();
    // a switch without cases would leave `ev` unused
    if !matching.is_empty() {
        g.p("\tswitch ev := response.Event.(type) {");
        for msg in matching {
            let wrapper = api_ident(g, config, &format!("{VARIANT_PREFIX}{}", msg.name()));
            g.p(format!("\tcase *{wrapper}:"));
            g.p(format!("\t\treturn ev.{}.{field}", msg.name()));
        }
        g.p("\t}");
    }

    let log = logger(g, config);
    g.p(format!(
        "\t{log}.Debugf(\"{func}: no {} in %T\", response.Event)",
        field.to_lowercase()
    ));
    g.p("\treturn nil");
    g.p("}");
    g.p("");
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::{
        DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileOptions,
        OneofDescriptorProto,
    };

    fn message(name: &str, fields: &[&str]) -> DescriptorProto {
        DescriptorProto {
            name: Some(name.to_string()),
            field: fields
                .iter()
                .map(|f| FieldDescriptorProto {
                    name: Some(f.to_string()),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    fn api_file(messages: Vec<DescriptorProto>) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some("fgs/fgs.proto".to_string()),
            options: Some(FileOptions {
                go_package: Some("github.com/isovalent/tetragon-oss/api/v1/fgs".to_string()),
                ..Default::default()
            }),
            message_type: messages,
            ..Default::default()
        }
    }

    fn response(variants: &[&str]) -> DescriptorProto {
        let mut msg = message("GetEventsResponse", &[]);
        msg.oneof_decl.push(OneofDescriptorProto {
            name: Some("event".to_string()),
            ..Default::default()
        });
        for v in variants {
            msg.field.push(FieldDescriptorProto {
                name: Some(v.to_string()),
                oneof_index: Some(0),
                ..Default::default()
            });
        }
        msg
    }

    fn render(desc: &FileDescriptorProto) -> String {
        let config = Config::default();
        let file = File::new(desc, &config).unwrap();
        let files = generate(&file, &config).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(
            files[0].filename(),
            "github.com/isovalent/tetragon-oss/api/v1/fgs/codegen/helpers/helpers.pb.go"
        );
        files[0].content()
    }

    #[test]
    fn type_string_covers_every_event() {
        let desc = api_file(vec![
            response(&["exec", "exit"]),
            message("Exec", &["process"]),
            message("Exit", &["process", "parent"]),
        ]);
        let out = render(&desc);

        assert!(out.contains("package helpers\n\nimport (\n"));
        assert!(out.contains("\tfgs \"github.com/isovalent/tetragon-oss/api/v1/fgs\"\n"));
        assert!(out.contains("\tfmt \"fmt\"\n"));
        assert!(out.contains("\tlogger \"github.com/isovalent/tetragon-oss/pkg/logger\"\n"));
        assert!(out.contains(
            "func ResponseTypeString(response *fgs.GetEventsResponse) (string, error) {"
        ));
        assert!(out.contains("\tcase *fgs.GetEventsResponse_Exec:\n\t\treturn \"Exec\", nil\n"));
        assert!(out.contains("\tcase *fgs.GetEventsResponse_Exit:\n\t\treturn \"Exit\", nil\n"));
        assert!(out.contains("\treturn \"\", fmt.Errorf(\"Unhandled response type %T\", event)\n"));
    }

    #[test]
    fn parent_accessor_only_lists_parent_events() {
        let desc = api_file(vec![
            response(&["exec", "exit"]),
            message("Exec", &["process"]),
            message("Exit", &["process", "parent"]),
        ]);
        let out = render(&desc);

        let parent = out
            .split("func ResponseGetParent")
            .nth(1)
            .expect("ResponseGetParent is generated");
        assert!(parent.contains("\t\treturn ev.Exit.Parent\n"));
        assert!(!parent.contains("GetEventsResponse_Exec"));

        let process = out
            .split("func ResponseGetProcess")
            .nth(1)
            .and_then(|rest| rest.split("func ResponseGetParent").next())
            .expect("ResponseGetProcess is generated");
        assert!(process.contains("\t\treturn ev.Exec.Process\n"));
        assert!(process.contains("\t\treturn ev.Exit.Process\n"));
        assert!(process.contains("logger.GetLogger().Debugf(\"ResponseGetProcess: no process in %T\""));
    }

    #[test]
    fn accessor_without_matching_events_has_no_switch() {
        let desc = api_file(vec![response(&["test"]), message("Test", &["message"])]);
        let out = render(&desc);

        let parent = out.split("func ResponseGetParent").nth(1).unwrap();
        assert!(!parent.contains("switch"));
        assert!(parent.contains("\treturn nil\n}"));
    }

    #[test]
    fn missing_anchor_fails_generation() {
        let desc = api_file(vec![message("Exec", &["process"])]);
        let config = Config::default();
        let file = File::new(&desc, &config).unwrap();
        let err = generate(&file, &config).unwrap_err();
        assert_eq!(err.to_string(), "Unable to find GetEventsResponse message");
    }
}
