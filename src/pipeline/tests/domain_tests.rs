//! Validation tests for pipeline value types.

use crate::pipeline::domain::{
    AgentName, AgentRoster, AgentSelection, BranchName, EntityKind, EntityRef, IdentityAllocator,
    MAX_NUMBERED_AGENTS, PathTraversalError, PullRequestUrl, RequestDetails, SandboxPath, TaskId,
    ValidationError,
};
use rstest::rstest;

#[rstest]
#[case("coder1")]
#[case("Reviewer_2")]
#[case("agent.alpha-beta")]
fn agent_name_accepts_valid_names(#[case] raw: &str) {
    let name = AgentName::new(raw).expect("valid agent name");
    assert_eq!(name.as_str(), raw);
}

#[test]
fn agent_name_trims_surrounding_whitespace() {
    let name = AgentName::new("  coder1  ").expect("valid agent name");
    assert_eq!(name.as_str(), "coder1");
}

#[rstest]
#[case("", ValidationError::EmptyAgentName)]
#[case("   ", ValidationError::EmptyAgentName)]
#[case("bad name", ValidationError::InvalidAgentName("bad name".to_owned()))]
#[case("coder/1", ValidationError::InvalidAgentName("coder/1".to_owned()))]
fn agent_name_rejects_invalid_names(#[case] raw: &str, #[case] expected: ValidationError) {
    assert_eq!(AgentName::new(raw), Err(expected));
}

#[test]
fn agent_name_rejects_overlong_names() {
    let raw = "a".repeat(101);
    assert!(matches!(
        AgentName::new(raw),
        Err(ValidationError::AgentNameTooLong(_))
    ));
}

#[test]
fn numbered_roster_counts_from_one() {
    let roster = AgentRoster::numbered(3).expect("valid roster");
    let names: Vec<&str> = roster.iter().map(AgentName::as_str).collect();
    assert_eq!(names, vec!["coder1", "coder2", "coder3"]);
}

#[rstest]
#[case(0, ValidationError::EmptyAgentRoster)]
#[case(MAX_NUMBERED_AGENTS + 1, ValidationError::RosterTooLarge(MAX_NUMBERED_AGENTS + 1))]
fn numbered_roster_rejects_out_of_range_counts(
    #[case] count: usize,
    #[case] expected: ValidationError,
) {
    assert_eq!(AgentRoster::numbered(count), Err(expected));
}

#[test]
fn roster_rejects_duplicate_agents() {
    let result = AgentRoster::from_names(["coder1", "coder2", "coder1"]);
    let duplicate = AgentName::new("coder1").expect("valid agent name");
    assert_eq!(result, Err(ValidationError::DuplicateAgent(duplicate)));
}

#[test]
fn roster_preserves_order() {
    let roster = AgentRoster::from_names(["zeta", "alpha"]).expect("valid roster");
    let names: Vec<&str> = roster.iter().map(AgentName::as_str).collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
    assert_eq!(roster.len(), 2);
}

#[rstest]
#[case(serde_json::json!(2), &["coder1", "coder2"])]
#[case(serde_json::json!(["c1", "c2", "c3"]), &["c1", "c2", "c3"])]
fn agent_selection_decodes_count_or_names(
    #[case] wire: serde_json::Value,
    #[case] expected: &[&str],
) {
    let selection: AgentSelection = serde_json::from_value(wire).expect("valid selection");
    let roster = selection.into_roster().expect("valid roster");
    let names: Vec<&str> = roster.iter().map(AgentName::as_str).collect();
    assert_eq!(names, expected);
}

#[test]
fn agent_selection_rejects_empty_name_list() {
    let selection = AgentSelection::Names(Vec::new());
    assert_eq!(selection.into_roster(), Err(ValidationError::EmptyAgentRoster));
}

#[rstest]
#[case("https://github.com/acme/app/pull/1")]
#[case("http://x")]
fn pull_request_url_accepts_http_urls(#[case] raw: &str) {
    let url = PullRequestUrl::new(raw).expect("valid url");
    assert_eq!(url.as_str(), raw);
}

#[rstest]
#[case("")]
#[case("ftp://example.com/pr")]
#[case("https://")]
#[case("https://example.com/pull 1")]
fn pull_request_url_rejects_invalid_urls(#[case] raw: &str) {
    assert!(matches!(
        PullRequestUrl::new(raw),
        Err(ValidationError::InvalidPullRequestUrl(_))
    ));
}

#[test]
fn branch_name_defaults_to_main() {
    assert_eq!(BranchName::default().as_str(), "main");
}

#[rstest]
#[case("")]
#[case("feature branch")]
#[case("refs:heads")]
#[case("a..b")]
fn branch_name_rejects_invalid_names(#[case] raw: &str) {
    assert!(matches!(
        BranchName::new(raw),
        Err(ValidationError::InvalidTargetBranch(_))
    ));
}

#[test]
fn request_details_reject_blank_title() {
    assert_eq!(
        RequestDetails::new("  ", "body"),
        Err(ValidationError::EmptyRequestTitle)
    );
}

#[rstest]
#[case("src/lib.rs", "src/lib.rs")]
#[case("./src//main.rs", "src/main.rs")]
#[case("src/../docs/readme.md", "docs/readme.md")]
#[case("src\\bin\\cli.rs", "src/bin/cli.rs")]
fn sandbox_path_normalises_relative_paths(#[case] raw: &str, #[case] expected: &str) {
    let path = SandboxPath::parse(raw).expect("path stays in sandbox");
    assert_eq!(path.as_str(), expected);
}

#[rstest]
#[case("/etc/passwd", PathTraversalError::Absolute("/etc/passwd".to_owned()))]
#[case("C:\\Windows", PathTraversalError::Absolute("C:\\Windows".to_owned()))]
#[case("../secret", PathTraversalError::Escapes("../secret".to_owned()))]
#[case("src/../../secret", PathTraversalError::Escapes("src/../../secret".to_owned()))]
#[case("./.", PathTraversalError::Empty("./.".to_owned()))]
fn sandbox_path_rejects_escapes(#[case] raw: &str, #[case] expected: PathTraversalError) {
    assert_eq!(SandboxPath::parse(raw), Err(expected));
}

#[test]
fn identity_allocator_counts_each_kind_independently() {
    let ids = IdentityAllocator::new();

    assert_eq!(ids.next(EntityKind::Request), 1);
    assert_eq!(ids.next(EntityKind::Request), 2);
    assert_eq!(ids.next(EntityKind::Task), 1);
    assert_eq!(ids.next(EntityKind::Plan), 1);
    assert_eq!(ids.next(EntityKind::Request), 3);
}

#[test]
fn entity_ref_renders_kind_and_value() {
    let reference = EntityRef::from(TaskId::new(3));
    assert_eq!(reference.kind(), EntityKind::Task);
    assert_eq!(reference.to_string(), "task 3");
}
