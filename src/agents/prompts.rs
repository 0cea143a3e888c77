//! Prompt text for the research agent, the scorer and the analysis sub-model

/// System prompt for the exploratory research conversation
pub const AGENT_SYSTEM_PROMPT: &str = "You are a research agent specialized in evaluating people and companies to determine intent alignment.

Your job:
1. Analyze the user's goal/product they want to sell
2. Research the target person/company using available tools
3. Gather evidence that shows whether their needs align with the user's offering
4. Synthesize findings into a clear assessment

Available research approaches:
- LinkedIn profile analysis: look for job roles, hiring patterns and company posts about challenges
- Company research: company details, recent posts, funding and expansion news
- Person research: news mentions, interviews and speaking engagements
- Deep analysis: hand large scraped content to analyze_with_llm for BANT signal extraction

Think step-by-step about what information you need to gather. Use tools methodically to build a complete picture.

When you have sufficient evidence to make an assessment, call the finish tool with your findings.";

/// System prompt for the scoring pass
pub const SCORING_SYSTEM_PROMPT: &str = "You are a sales qualification analyst. You score prospects with the BANT framework:
- Budget: can the prospect's organisation afford the offering (funding, growth, company size)?
- Authority: does the prospect make or strongly influence buying decisions?
- Need: do their stated challenges, hiring and activity show a problem the offering solves?
- Timing: is there evidence they are looking to act soon?

Respond ONLY with a JSON object with exactly these keys:
{
  \"good_signals\": [\"...\"],
  \"bad_signals\": [\"...\"],
  \"score\": <integer from 1 to 100>,
  \"reasoning\": \"...\"
}
Every signal must cite evidence from the research context. Do not add any text outside the JSON object.";

/// System prompt for `analyze_with_llm` and the news relevance filters
pub const ANALYSIS_SYSTEM_PROMPT: &str = "You are a careful research analyst. Reason step by step over the provided material and answer the request precisely. Only state what the material supports.";

/// First user message of a research run
pub fn build_agent_context(goal: &str, profile_url: &str) -> String {
    format!(
        "User's Goal: {goal}\n\nLinkedIn Profile to Research: {profile_url}\n\n\
         Please research this person and determine if their needs/pain points align with the user's goal. \
         Use available tools to gather comprehensive information."
    )
}

/// User message for the scoring pass
pub fn build_scoring_request(summary: &str, goal: &str, context: &str) -> String {
    format!(
        "User's Goal: {goal}\n\nResearch Summary:\n{summary}\n\nResearch Context:\n{context}\n\n\
         Score how well this prospect aligns with the user's goal."
    )
}

/// User message for a free-form analysis request
pub fn build_analysis_request(prompt: &str, context: &str) -> String {
    if context.trim().is_empty() {
        prompt.to_string()
    } else {
        format!("{prompt}\n\nContext:\n{context}")
    }
}

/// Who a news search is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsSubject {
    Company,
    Person,
}

impl NewsSubject {
    fn label(self) -> &'static str {
        match self {
            NewsSubject::Company => "company",
            NewsSubject::Person => "person",
        }
    }

    fn title(self) -> &'static str {
        match self {
            NewsSubject::Company => "Company",
            NewsSubject::Person => "Person",
        }
    }
}

/// Prompt asking the analysis model which search hits concern the right subject
pub fn build_news_filter_prompt(
    subject: NewsSubject,
    name: &str,
    context: &str,
    results_json: &str,
) -> String {
    let label = subject.label();
    let title = subject.title();
    format!(
        "You are validating search results for {label} news.\n\n\
         Target {title}: {name}\n\
         {title} Context: {context}\n\n\
         Search Results:\n{results_json}\n\n\
         Task: Filter out any results that are clearly about a DIFFERENT {label} with the same name. \
         Return only the result indices (0-indexed) that are relevant to the target {label}.\n\n\
         Return your response as a JSON array of indices, like: [0, 1, 4]\n\
         If no results are relevant, return: []\n\
         If you're unsure about a result, include it (better to be inclusive)."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_context_names_goal_and_profile() {
        let context = build_agent_context(
            "Sell SOC automation",
            "https://www.linkedin.com/in/dana-reyes/",
        );
        assert!(context.starts_with("User's Goal: Sell SOC automation\n\n"));
        assert!(context.contains("LinkedIn Profile to Research: https://www.linkedin.com/in/dana-reyes/"));
    }

    #[test]
    fn test_analysis_request_skips_blank_context() {
        assert_eq!(build_analysis_request("Summarise", "  "), "Summarise");
        assert!(build_analysis_request("Summarise", "posts").ends_with("Context:\nposts"));
    }

    #[test]
    fn test_news_filter_prompt_mentions_subject() {
        let prompt = build_news_filter_prompt(NewsSubject::Person, "Dana Reyes", "CISO", "[]");
        assert!(prompt.contains("Target Person: Dana Reyes"));
        assert!(prompt.contains("DIFFERENT person"));
    }
}
