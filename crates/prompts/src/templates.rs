/// Prefix the model puts in front of the beginner prompt.
pub const BEGINNER_KEY: &str = "prompt_beginner";
/// Prefix the model puts in front of the intermediate prompt.
pub const INTERMEDIATE_KEY: &str = "prompt_intermediate";

const BEGINNER: &str = "
        The following scenario:

        Given 6 images, each representing the same 3D object from different views.
        The 3D object shown in the images is the result of a user prompt to a text to 3D SOTA model.
        The user's aim was to be able to use the 3D object in a CAD system.

        Prompt beginner:
        Let's assume the user does not have much experience with CAD.
        What could the user's prompt have looked like?
        The prompt should not be longer than 80 words.

        Only the prompt should be included in your answer. Do not use colour descriptions.
        Your answer must be in german.
        The format of your answer is as follows:

        prompt_beginner: <prompt>
    ";

const INTERMEDIATE: &str = "
        The following scenario:

        Given 6 images, each representing the same 3D object from different views.
        The 3D object shown in the images is the result of a user prompt to a text to 3D SOTA model.
        The user's aim was to be able to use the 3D object in a CAD system.

        Prompt intermediate:
        Assuming the user already has good experience with CAD.
        What could the user's prompt have looked like?
        The prompt should not be longer than 80 words.

        Only the prompt should be included in your answer. Do not use colour descriptions.
        Your answer must be in german.
        The format of your answer is as follows:

        prompt_intermediate: <prompt>
    ";

/// The two instructions sent alongside the image views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    pub beginner: String,
    pub intermediate: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            beginner: BEGINNER.to_string(),
            intermediate: INTERMEDIATE.to_string(),
        }
    }
}
