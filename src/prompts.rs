use crate::models::JobProfile;

// Default prompts for the LLM. Each artifact has a system prompt and a user
// prompt template; templates use {job_title}, {tools}, {industry},
// {project_title} and {count} placeholders and can be overridden through the
// app config.

pub const DEFAULT_IDEAS_SYSTEM_PROMPT: &str = "You are a career mentor for data professionals that suggests realistic, implementable portfolio projects.";
pub const DEFAULT_IDEAS_USER_PROMPT: &str = "Generate exactly {count} project titles for a {job_title} using {tools} with a focus in the {industry} industry.
Format the response as a numbered list (1., 2., etc.).
Make these projects realistic, implementable, and tailored to the job role.";

pub const DEFAULT_DETAILS_SYSTEM_PROMPT: &str = "You are a senior data professional that writes thorough, well-structured project plans in markdown.";
pub const DEFAULT_DETAILS_USER_PROMPT: &str = "Provide a detailed explanation for the project: \"{project_title}\"
This is for a {job_title} using {tools} with a focus in the {industry} industry.

Structure your response with the following sections:
1. Problem Statement: Clearly define the problem being addressed
2. Project Goals: List the specific objectives (3-5 bullet points)
3. Data Requirements: What data will be needed and potential sources
4. Technical Approach: Step-by-step workflow with methodologies and tools
5. Implementation Guide: Detailed implementation steps
6. Deliverables: Expected outputs and their business value
7. Skills Developed: What skills this project helps develop
8. Extensions: Ways to extend or enhance the project

Use markdown formatting for headers and sections.";

pub const DEFAULT_MIND_MAP_SYSTEM_PROMPT: &str = "You are an assistant that produces strictly valid JSON documents describing project mind maps.";
pub const DEFAULT_MIND_MAP_USER_PROMPT: &str = "Create a mind map for the project: \"{project_title}\"
This is for a {job_title} using {tools} with a focus in the {industry} industry.

Format the response as a properly formatted JSON with the following structure:
{
    \"center\": \"{project_title}\",
    \"main_branches\": [
        {
            \"name\": \"Branch 1\",
            \"sub_branches\": [\"Sub-branch 1.1\", \"Sub-branch 1.2\"]
        },
        {
            \"name\": \"Branch 2\",
            \"sub_branches\": [\"Sub-branch 2.1\", \"Sub-branch 2.2\"]
        }
    ]
}

Create 4-6 main branches that represent key aspects of the project.
Each main branch should have 2-4 sub-branches with more specific details.
Make sure all values are meaningful and relevant to the project.
Ensure the response is ONLY valid JSON with no additional text before or after.
Use double quotes for all keys and string values.";

pub const DEFAULT_TIMELINE_SYSTEM_PROMPT: &str = "You are an assistant that produces strictly valid JSON documents describing project timelines.";
pub const DEFAULT_TIMELINE_USER_PROMPT: &str = "Create a project timeline for the project: \"{project_title}\"
This is for a {job_title} using {tools} with a focus in the {industry} industry.

Format the response as a properly formatted JSON with the following structure:
{
    \"phases\": [\"Phase 1\", \"Phase 2\", \"Phase 3\"],
    \"start_dates\": [\"2025-01-01\", \"2025-02-01\", \"2025-03-01\"],
    \"end_dates\": [\"2025-01-31\", \"2025-02-28\", \"2025-03-31\"],
    \"descriptions\": [\"Description 1\", \"Description 2\", \"Description 3\"]
}

Include 4-6 realistic project phases with appropriate start and end dates.
Make sure all dates are in YYYY-MM-DD format and make sense chronologically.
Ensure the response is ONLY valid JSON with no additional text before or after.
Each description should be 1-2 sentences explaining the phase activities.
Use double quotes for all keys and string values.";

pub const DEFAULT_SKILLS_GRAPH_SYSTEM_PROMPT: &str = "You are an assistant that produces strictly valid JSON documents describing skill networks.";
pub const DEFAULT_SKILLS_GRAPH_USER_PROMPT: &str = "Create a network of skills required for the project: \"{project_title}\"
This is for a {job_title} using {tools} with a focus in the {industry} industry.

Format the response as a properly formatted JSON with the following structure:
{
    \"nodes\": [
        {\"id\": \"Skill 1\", \"group\": 1},
        {\"id\": \"Skill 2\", \"group\": 2},
        {\"id\": \"Skill 3\", \"group\": 3}
    ],
    \"links\": [
        {\"source\": \"Skill 1\", \"target\": \"Skill 2\", \"value\": 1},
        {\"source\": \"Skill 2\", \"target\": \"Skill 3\", \"value\": 2},
        {\"source\": \"Skill 1\", \"target\": \"Skill 3\", \"value\": 3}
    ]
}

Create at least 8-12 skill nodes with appropriate links between them.
Group similar skills together (same group number).
Include both technical and soft skills relevant to the project.
Ensure the response is ONLY valid JSON with no additional text before or after.
Use double quotes for all keys and string values.";

pub const DEFAULT_SAMPLE_DATA_SYSTEM_PROMPT: &str = "You are a data architect that sketches realistic data structures for analytics projects.";
pub const DEFAULT_SAMPLE_DATA_USER_PROMPT: &str = "For the project \"{project_title}\" in the {industry} industry,
suggest a realistic data structure that might be used.

Format your response as a list of possible tables/collections with their fields.
For each table/collection, include 3-5 sample records with realistic values.

Focus on data that would be relevant for a {job_title} using {tools}.";

// Substitute the placeholder fields into a prompt template. Plain string
// replacement, never fails.
fn fill(template: &str, profile: &JobProfile, project_title: &str, count: usize) -> String {
    template
        .replace("{job_title}", &profile.job_title)
        .replace("{tools}", &profile.tools)
        .replace("{industry}", &profile.industry)
        .replace("{project_title}", project_title)
        .replace("{count}", &count.to_string())
}

pub fn ideas_prompt(profile: &JobProfile, count: usize, template: Option<&str>) -> String {
    fill(template.unwrap_or(DEFAULT_IDEAS_USER_PROMPT), profile, "", count)
}

pub fn details_prompt(profile: &JobProfile, project_title: &str, template: Option<&str>) -> String {
    fill(
        template.unwrap_or(DEFAULT_DETAILS_USER_PROMPT),
        profile,
        project_title,
        0,
    )
}

pub fn mind_map_prompt(profile: &JobProfile, project_title: &str, template: Option<&str>) -> String {
    fill(
        template.unwrap_or(DEFAULT_MIND_MAP_USER_PROMPT),
        profile,
        project_title,
        0,
    )
}

pub fn timeline_prompt(profile: &JobProfile, project_title: &str, template: Option<&str>) -> String {
    fill(
        template.unwrap_or(DEFAULT_TIMELINE_USER_PROMPT),
        profile,
        project_title,
        0,
    )
}

pub fn skills_graph_prompt(
    profile: &JobProfile,
    project_title: &str,
    template: Option<&str>,
) -> String {
    fill(
        template.unwrap_or(DEFAULT_SKILLS_GRAPH_USER_PROMPT),
        profile,
        project_title,
        0,
    )
}

pub fn sample_data_prompt(
    profile: &JobProfile,
    project_title: &str,
    template: Option<&str>,
) -> String {
    fill(
        template.unwrap_or(DEFAULT_SAMPLE_DATA_USER_PROMPT),
        profile,
        project_title,
        0,
    )
}
