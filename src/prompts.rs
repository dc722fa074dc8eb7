pub const POSE_DIRECTOR: &str = include_str!("../data/prompts/pose_director.txt");
pub const CAMPAIGN_IMAGE: &str = include_str!("../data/prompts/campaign_image.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
