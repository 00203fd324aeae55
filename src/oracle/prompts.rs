//! Request texts for the three oracle intents plus the decision node, and
//! the one-shot request of the single-agent baseline.

pub const SYSTEM_PROMPT: &str = "You are a software developer, helpful and a Java expert.";

pub const SINGLE_AGENT_SYSTEM_PROMPT: &str = "You are a powerful model specialized in refactoring \
     Java code. Code refactoring is the process of improving the internal structure, readability \
     and maintainability of a software codebase without altering its external behavior or \
     functionality. You must output a refactored version of the code. Do not return \
     natural-language explanations.";

#[must_use]
pub fn needs_refactoring(class_source: &str, metrics: &str) -> String {
    format!(
        "For each method in the provided Java class:\n\
         {class_source}\n\n\
         Answer yes or no depending on whether the method needs refactoring to improve its \
         readability, maintainability, clarity and adherence to basic coding practices. \
         Base the assessment on the method's complexity, the class's weighted methods per \
         class and the lack of cohesion of methods in the class.\n\n\
         Class CKO metrics:\n\
         {metrics}\n\n\
         Respond with a JSON object of the form:\n\
         {{\n  \"method1\": \"yes, improvement instruction\",\n  \"method2\": \"no\"\n}}\n\n\
         Do not add any natural-language explanation."
    )
}

#[must_use]
pub fn should_proceed(instructions: &str) -> String {
    format!(
        "Output: true or false.\n\n\
         Given this set of per-method refactoring instructions, does at least one method \
         need improvement?\n\n\
         Instructions: {instructions}\n\n\
         Do not add any natural-language explanation."
    )
}

#[must_use]
pub fn improve(
    instructions: &str,
    metrics: &str,
    class_source: &str,
    previous_failure: Option<&str>,
) -> String {
    let mut prompt = format!(
        "Following these instructions:\n{instructions}\n\n\
         and these CKO metrics:\n{metrics}\n\n\
         improve the Java code below and its CKO metrics. Assume the class and its methods \
         are functionally correct. Do not alter the behaviour of any externally visible \
         method; keep the code syntactically and semantically correct. Do not remove any \
         comments or annotations.\n\n\
         {class_source}\n\n\
         Return the complete Java class in a single code block without natural-language \
         explanation."
    );
    if let Some(failure) = previous_failure {
        prompt.push_str("\n\nThe previous attempt was rejected:\n");
        prompt.push_str(failure);
    }
    prompt
}

#[must_use]
pub fn refactor_directly(class_source: &str) -> String {
    format!(
        "Unrefactored code snippet (Java):\n{class_source}\n\n\
         Refactored version of the same code snippet:"
    )
}

#[must_use]
pub fn judge_improvement(
    before: &str,
    before_metrics: &str,
    after: &str,
    after_metrics: &str,
) -> String {
    format!(
        "Given the Java code before and after the proposed changes, together with their CKO \
         metrics, assess whether the code has improved. Compare both versions and their \
         metrics and decide whether the change results in better quality, readability and \
         maintainability.\n\n\
         Java code before the change:\n{before}\n\n\
         CKO metrics before the change:\n{before_metrics}\n\n\
         Java code after the change:\n{after}\n\n\
         CKO metrics after the change:\n{after_metrics}\n\n\
         Return true or false, without natural-language explanation."
    )
}
