//! Prompt templates for the three roles

use crate::agent::AgentMode;
use crate::corpus::{Catalog, DirectoryListing};
use crate::trajectory::{ExecutionResult, Step, Trajectory};

/// Chat models: how code must be emitted and how to finish.
const CHAT_CODE_FORMAT: &str = r#"CRITICAL: Code Format Requirements
You MUST format your code responses using this exact pattern:
Thought: [Your reasoning here]
Code:
```py
[Your Python code here]
```<end_code>

Do NOT use any other code format. Always include "Thought:", "Code:", and the closing ```<end_code> marker.
Print what you need to see; printed output comes back to you as an Observation.
When you are done, call final_answer(value) inside a code block. Never import final_answer, you have it already.
File access is read-only: open() accepts only 'r', 'rb' or 'rt'. exec, eval and compile are unavailable."#;

/// Reasoning models plan internally; they are asked for the code block alone.
const REASONING_CODE_FORMAT: &str = r#"Output Format
Reply with a single Python code block and nothing after it:
```py
[Your Python code here]
```<end_code>

Keep your reasoning to yourself; only the code block is executed.
Print what you need to see; printed output comes back to you as an Observation.
When you are done, call final_answer(value) inside a code block. Never import final_answer, you have it already.
File access is read-only: open() accepts only 'r', 'rb' or 'rt'. exec, eval and compile are unavailable."#;

/// Templates for the Librarian, Strategist and Executor prompts
pub struct RolePromptTemplate;

impl RolePromptTemplate {
    /// Code-format section for a prompting mode
    pub fn code_format(mode: AgentMode) -> &'static str {
        match mode {
            AgentMode::Reasoning => REASONING_CODE_FORMAT,
            AgentMode::Chat => CHAT_CODE_FORMAT,
        }
    }

    pub fn librarian_system(corpus_path: &str, imports: &str, mode: AgentMode) -> String {
        let code_format = Self::code_format(mode);
        format!(
            r#"You are the Librarian Agent, a specialist in data discovery and knowledge organization.

Your primary responsibilities:
1. **Data Discovery**: Catalog all available data sources, files and documentation in `{corpus_path}`
2. **Knowledge Extraction**: Read and understand the content, structure and relationships of the data
3. **Information Organization**: Create structured summaries of findings for other agents
4. **Context Maintenance**: Keep track of data constraints, formats and dependencies

Your multi-step workflow:
1. **Explore & Execute**: Read the files from the pre-provided directory listing with proper error handling
2. **Validate Results**: Inspect what you built and check for failed loads
3. **Retry if Needed**: If any file failed to load, fix the code and retry
4. **Final Check**: Only when everything loaded correctly, call final_answer()

{code_format}

Available imports: {imports}

Remember: You are the foundation of knowledge for the entire system. Be thorough and accurate."#
        )
    }

    pub fn strategist_system(imports: &str, mode: AgentMode) -> String {
        let code_format = Self::code_format(mode);
        format!(
            r#"You are the Strategist Agent, a master planner and decision-maker.

Your primary responsibilities:
1. **Trajectory Planning**: Create detailed, step-by-step execution plans based on librarian findings
2. **Decision Making**: Analyze executor feedback and decide on next steps
3. **Plan Adaptation**: Modify strategies based on intermediate results and new information
4. **Goal Decomposition**: Break complex tasks into manageable, executable steps

When creating trajectories:
- Analyze the librarian's data catalog and knowledge summary
- Consider data constraints and limitations
- Create logical, sequential steps that build upon each other
- Include validation steps

Decision-making process:
1. Evaluate executor results against expected outcomes
2. Determine if the current trajectory should continue, be modified, or restarted
3. Provide clear next-step instructions

{code_format}

Available imports: {imports}

Remember: You are the strategic mind that guides the entire process. Think several steps ahead."#
        )
    }

    pub fn executor_system(imports: &str, mode: AgentMode) -> String {
        let code_format = Self::code_format(mode);
        format!(
            r#"You are the Executor Agent, a code implementation and execution specialist.

Your primary responsibilities:
1. **Code Implementation**: Translate strategist plans into executable Python code
2. **Data Manipulation**: Perform data processing, analysis and transformations
3. **Execution Management**: Run code and capture all outputs and errors
4. **Result Communication**: Report the outcome clearly

When executing tasks:
- Follow the strategist's instructions precisely
- Handle errors and report meaningful error messages
- Use only read-only operations for data access
- Pass the final answer itself (not an explanation of it) to final_answer()

{code_format}

Available imports: {imports}

Remember: You are the hands that implement the strategic vision. Be precise and thorough."#
        )
    }

    /// Librarian request: build a catalog from the pre-read listing
    pub fn catalog_request(listing: &DirectoryListing) -> String {
        format!(
            r#"You are cataloging data sources in the directory: {path}

**DIRECTORY CONTENTS (pre-read for you):**
{listing}

The directory has been explored and contains {total} files.
DO NOT write code to list the directory; the file list above is complete and accurate.

Your task:
1. For EACH file listed above, read its content using the file path provided
2. Classify each file based on its content
3. Identify relationships between files
4. Extract key information from documentation files

Build a dictionary with a "files" list where EACH file has:
- **name**: file name
- **format**: file extension (csv, json, md, txt)
- **file_type**: "data" (actual records) or "documentation" (instructions, metadata, manuals)
- **is_critical**: true for documentation with essential usage instructions and for data files the documentation names as key files; false otherwise
- **summary**: brief description of contents and purpose
- **content_details**: for data files the columns, row count and at most 3 sample rows; for documentation the key instructions and constraints

Also include these top-level fields:
- **data_relationships**: how files relate to each other
- **key_constraints**: important limitations or rules from documentation
- **usage_guidelines**: critical instructions from documentation files

Return the dictionary with final_answer(catalog_dict)."#,
            path = listing.directory_path,
            listing = listing.to_prompt_json(),
            total = listing.total_files,
        )
    }

    /// Librarian request: knowledge for one query. Critical files are named
    /// explicitly and must be read regardless of relevance.
    pub fn knowledge_request(query: &str, listing: &DirectoryListing, catalog: &Catalog) -> String {
        let critical: Vec<&str> = catalog.critical_entries().map(|e| e.name.as_str()).collect();
        let critical_list = if critical.is_empty() {
            "(none marked critical)".to_string()
        } else {
            critical
                .iter()
                .map(|name| format!("- {name}"))
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            r#"Based on the data in {path}, extract domain knowledge relevant to: {query}

**DIRECTORY CONTENTS (pre-read for you):**
{listing}

The directory has been explored and contains {total} files.
DO NOT write code to list the directory; the file list above is complete and accurate.

You have access to the following pre-computed catalog of data sources:
{catalog}

**CRITICAL SOURCES (must ALL be read, whatever the query):**
{critical_list}

Your task:
1. Read EVERY critical source listed above, even if it does not look related to the query
2. Identify which additional files are relevant to this specific query and read them
3. Extract key concepts, definitions and patterns from all sources
4. Document data relationships and constraints

Build a dictionary including:
- **critical_sources_read**: every critical file you read (must include ALL critical files)
- **relevant_sources**: additional relevant files for this query
- **key_concepts**: key concepts and definitions
- **data_relationships**: relationships and dependencies
- **constraints**: constraints and limitations, especially from critical documentation
- **usage_guidelines**: usage instructions from critical sources
- **sample_data**: sample data or statistics that illustrate the domain

Return it with final_answer(). Focus on actionable information that helps answer the query."#,
            path = listing.directory_path,
            listing = listing.to_prompt_json(),
            total = listing.total_files,
            catalog = catalog.to_prompt_json(),
        )
    }

    /// Strategist request: initial trajectory from the combined findings
    pub fn create_trajectory_request(task: &str, findings: &serde_json::Value) -> String {
        format!(
            r#"Create a detailed execution trajectory for the task: {task}

Librarian findings:
{findings}

Create a step-by-step plan that the Executor can follow. Each step should be specific, actionable, and build upon previous steps.
Return the plan with final_answer()."#,
            findings = serde_json::to_string_pretty(findings).unwrap_or_default(),
        )
    }

    /// Strategist request: judge one execution result
    pub fn evaluate_request(trajectory: &Trajectory, result: &ExecutionResult) -> String {
        format!(
            r#"Evaluate the executor's result and decide the next steps:

Current trajectory:
{trajectory}

Executor result:
{result}

Based on this result:
1. Was the step successful?
2. Should we continue to the next step, modify the current step, or restart?
3. What specific instructions should be given to the executor for the next iteration?
Return your decision with final_answer()."#,
            trajectory = serde_json::to_string_pretty(trajectory).unwrap_or_default(),
            result = serde_json::to_string_pretty(result).unwrap_or_default(),
        )
    }

    /// Executor request: carry out one step
    pub fn execute_step_request(step: &Step, context: &serde_json::Value) -> String {
        format!(
            r#"Execute the following step:

Instructions:
{step}

Context:
{context}

Implement the required code and execute it. Return the result of the step with final_answer()."#,
            step = serde_json::to_string_pretty(step).unwrap_or_default(),
            context = serde_json::to_string_pretty(context).unwrap_or_default(),
        )
    }

    /// Feedback after running a code block
    pub fn observation(output: &str) -> String {
        format!("Observation:\n{output}")
    }

    /// Feedback when a reply carried no code block
    pub fn missing_code(mode: AgentMode) -> &'static str {
        match mode {
            AgentMode::Reasoning => {
                "Error: no code block found. Reply with a ```py block ending in ```<end_code>, and call final_answer() when you are done."
            }
            AgentMode::Chat => {
                "Error: no code block found. Reply with Thought:, Code: and a ```py block ending in ```<end_code>, and call final_answer() when you are done."
            }
        }
    }
}
