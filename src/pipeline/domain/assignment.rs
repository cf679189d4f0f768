//! Pure assignment policies binding tasks to agents.

use super::{AgentName, AgentRoster, Task, TaskId, TaskState};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One task bound to one agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    task_id: TaskId,
    agent: AgentName,
}

impl Assignment {
    /// Creates an assignment of `task_id` to `agent`.
    #[must_use]
    pub const fn new(task_id: TaskId, agent: AgentName) -> Self {
        Self { task_id, agent }
    }

    /// Returns the assigned task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the agent the task is bound to.
    #[must_use]
    pub const fn agent(&self) -> &AgentName {
        &self.agent
    }
}

/// Distributes `tasks` over `roster` in round-robin order.
///
/// The task at position *i* is bound to `roster[i mod N]`.
///
/// # Examples
///
///     use refactory::pipeline::domain::{AgentRoster, TaskId, round_robin};
///
///     let roster = AgentRoster::from_names(["a", "b"]).expect("valid roster");
///     let tasks = (1..=5).map(TaskId::new);
///     let agents: Vec<String> = round_robin(tasks, &roster)
///         .iter()
///         .map(|assignment| assignment.agent().to_string())
///         .collect();
///     assert_eq!(agents, ["a", "b", "a", "b", "a"]);
#[must_use]
pub fn round_robin(
    tasks: impl IntoIterator<Item = TaskId>,
    roster: &AgentRoster,
) -> Vec<Assignment> {
    tasks
        .into_iter()
        .zip(roster.iter().cycle())
        .map(|(task_id, agent)| Assignment::new(task_id, agent.clone()))
        .collect()
}

/// Selects backlog tasks for idle agents.
///
/// Each roster agent not in `busy` receives at most one `unassigned` task,
/// taken in the given task order. Agents are considered in roster order.
#[must_use]
pub fn backlog_admissions<'a, S>(
    tasks: impl IntoIterator<Item = &'a Task>,
    roster: &AgentRoster,
    busy: &HashSet<AgentName, S>,
) -> Vec<Assignment>
where
    S: std::hash::BuildHasher,
{
    let idle_agents = roster.iter().filter(|agent| !busy.contains(*agent));
    tasks
        .into_iter()
        .filter(|task| task.state() == TaskState::Unassigned)
        .zip(idle_agents)
        .map(|(task, agent)| Assignment::new(task.id(), agent.clone()))
        .collect()
}

/// Collects the agents holding at least one task in `assigned` state.
#[must_use]
pub fn busy_agents<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> HashSet<AgentName> {
    tasks
        .into_iter()
        .filter(|task| task.state() == TaskState::Assigned)
        .filter_map(Task::agent)
        .cloned()
        .collect()
}
