//! Unit tests for decoding generator ticket lists and resolving plan
//! blueprints.

use crate::pipeline::domain::{
    PlanBlueprint, RequestId, STUB_TASKS, TaskDefinition, TicketDecodeError, ValidationError,
    decode_tickets, stub_design_doc,
};
use rstest::rstest;

fn titles(tasks: &[TaskDefinition]) -> Vec<&str> {
    tasks.iter().map(TaskDefinition::title).collect()
}

#[rstest]
#[case(r#"[{"title": "A", "detail": "a"}, {"title": "B", "detail": "b"}]"#)]
#[case("```json\n[{\"title\": \"A\", \"detail\": \"a\"}, {\"title\": \"B\"}]\n```")]
#[case("```\n[{\"title\": \"A\"}, {\"title\": \"B\", \"description\": \"b\"}]\n```")]
fn decode_accepts_plain_and_fenced_lists(#[case] raw: &str) {
    let tasks = decode_tickets(raw).expect("tickets decode");
    assert_eq!(titles(&tasks), ["A", "B"]);
}

#[test]
fn decode_reads_description_as_detail() {
    let tasks = decode_tickets(r#"[{"title": "A", "description": "from alias"}]"#)
        .expect("tickets decode");
    assert_eq!(tasks.first().map(TaskDefinition::detail), Some("from alias"));
}

#[rstest]
#[case("not json")]
#[case(r#"{"title": "A"}"#)]
#[case(r#"[{"detail": "no title"}]"#)]
fn decode_rejects_malformed_lists(#[case] raw: &str) {
    assert!(matches!(
        decode_tickets(raw),
        Err(TicketDecodeError::Malformed(_))
    ));
}

#[test]
fn decode_rejects_empty_list() {
    assert_eq!(decode_tickets("[]"), Err(TicketDecodeError::Empty));
}

#[test]
fn decode_reports_position_of_blank_title() {
    let result = decode_tickets(r#"[{"title": "A"}, {"title": "  "}]"#);
    assert_eq!(
        result,
        Err(TicketDecodeError::InvalidTicket {
            index: 1,
            source: ValidationError::EmptyTaskTitle,
        })
    );
}

#[test]
fn stub_blueprint_resolves_to_stub_tasks() {
    let request_id = RequestId::new(4);
    let (design_doc, tasks) = PlanBlueprint::stub().resolve(request_id);

    assert_eq!(design_doc, stub_design_doc(request_id));
    let expected: Vec<&str> = STUB_TASKS.iter().map(|(title, _)| *title).collect();
    assert_eq!(titles(&tasks), expected);
}

#[test]
fn explicit_tasks_keep_stub_design_doc_by_default() {
    let request_id = RequestId::new(2);
    let definitions = vec![TaskDefinition::new("Only task", "").expect("valid definition")];
    let (design_doc, tasks) = PlanBlueprint::stub()
        .with_tasks(definitions)
        .resolve(request_id);

    assert_eq!(design_doc, stub_design_doc(request_id));
    assert_eq!(titles(&tasks), ["Only task"]);
}

#[test]
fn explicit_design_doc_is_used_with_stub_tasks() {
    let blueprint = PlanBlueprint::stub().with_design_doc("X");
    assert_eq!(blueprint.task_count(), STUB_TASKS.len());

    let (design_doc, tasks) = blueprint.resolve(RequestId::new(1));
    assert_eq!(design_doc, "X");
    assert_eq!(tasks.len(), STUB_TASKS.len());
}

#[test]
fn blueprint_with_empty_task_list_is_invalid() {
    assert_eq!(PlanBlueprint::stub().validate(), Ok(()));
    assert_eq!(
        PlanBlueprint::stub().with_tasks(Vec::new()).validate(),
        Err(ValidationError::NoTaskDefinitions)
    );
}
