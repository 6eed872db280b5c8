mod agent_loop;

pub use agent_loop::{AgentConfig, AgentLoop, AgentOutcome, AgentRun};
