// 回复提示词和兜底文本

use crate::models::{Emotion, ResponseType};
use regex::Regex;
use std::sync::OnceLock;

/// 根据情绪和注意力生成对话提示
pub fn generate_prompt(emotion: Emotion, attention_score: u8, response_type: ResponseType) -> String {
    let mut prompt = format!(
        "You are Gebral, an in-car AI co-pilot with the shimmer voice. You're trained to respond to the driver's emotional state. The driver is currently detected as '{}' with an attention score of {}/100. ",
        emotion, attention_score
    );

    prompt.push_str(
        "Keep your response short (under 100 words) and conversational. Be empathetic but professional. ",
    );

    prompt.push_str(match response_type {
        ResponseType::Alert => "IMPORTANT: The driver needs immediate attention! Provide a direct, clear alert about their distraction or low attention. Use a firm but caring tone. Suggest they focus on the road or consider pulling over safely. Keep it very brief and direct.",
        ResponseType::Concern => "The driver may be angry, tired, or showing concerning attention levels. Express genuine concern for their wellbeing. Suggest practical solutions like taking a break, deep breathing, or adjusting the temperature. Avoid being pushy.",
        ResponseType::Support => "The driver appears sad or anxious. Provide gentle emotional support and reassurance. Suggest coping strategies like breathing exercises or listening to calming music. Keep your tone warm and empathetic.",
        ResponseType::Encourage => "The driver appears to be doing well. Offer positive reinforcement about their driving or a brief, uplifting comment. Keep it natural and not overly cheerful. You might mention the weather, suggest a good music choice, or simply acknowledge their good state.",
        ResponseType::Emergency => "EMERGENCY SITUATION! The driver may be unresponsive or has looked away from the road for too long. Use a loud, clear voice to attempt to get their attention. State that emergency protocols may be activated if they don't respond. Be very direct and urgent.",
    });

    prompt
}

/// 对话服务失败时的兜底回复
pub fn fallback_response(response_type: ResponseType) -> &'static str {
    match response_type {
        ResponseType::Alert => "Please keep your eyes on the road. Your attention level is low. Consider pulling over if you need a break.",
        ResponseType::Concern => "I've noticed you may be feeling tired or frustrated. Would you like me to suggest a rest stop nearby?",
        ResponseType::Support => "It seems like you might be feeling a bit down. Would you like me to play some uplifting music?",
        ResponseType::Encourage => "You're driving well and seem to be in good spirits. Let me know if you need anything.",
        ResponseType::Emergency => "ATTENTION! Please respond! If you don't respond, emergency protocols will be activated. Are you alright?",
    }
}

/// 去掉回复首尾的引号
pub fn clean_response(text: &str) -> String {
    static QUOTES: OnceLock<Regex> = OnceLock::new();
    let re = QUOTES.get_or_init(|| Regex::new(r#"^["']|["']$"#).expect("静态正则"));
    re.replace_all(text.trim(), "").into_owned()
}
