// Prompt constants for job ranking.

use serde_json::{json, Value};

use crate::llm_client::ToolSpec;

pub const RANK_JOBS_TOOL: &str = "rank_jobs";

/// System prompt for ranking. Replace `{focus_basis}` before sending.
pub const RANKING_SYSTEM_TEMPLATE: &str = "You are a career counselor helping students find the best job matches. \
Analyze the student's profile and rank the provided jobs from most to least relevant based on their {focus_basis}. \
Return the job IDs ordered by relevance (most relevant first) by calling the rank_jobs function. Include ALL job IDs.";

/// User prompt for ranking. Replace `{focus_area}`, `{bio}`, `{jobs}` and `{focus_goal}`.
pub const RANKING_PROMPT_TEMPLATE: &str = "Student Profile:
{focus_area}
Bio/Skills: {bio}

Available Jobs:
{jobs}

Rank these jobs by relevance for this student's {focus_goal}.";

/// One posting block inside `{jobs}`.
pub const JOB_BLOCK_TEMPLATE: &str = "
ID: {id}
Title: {title}
Company: {company}
Type: {employment_type}
Description: {description}
Requirements: {requirements}
Location: {location}
---";

/// The forced function call: a single required array of posting ids, nothing else.
pub fn rank_jobs_tool() -> ToolSpec {
    ToolSpec {
        name: RANK_JOBS_TOOL,
        description: "Return job IDs ranked by relevance",
        parameters: rank_jobs_schema(),
    }
}

fn rank_jobs_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "ranked_job_ids": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Array of job IDs ordered by relevance (most relevant first)"
            }
        },
        "required": ["ranked_job_ids"],
        "additionalProperties": false
    })
}
