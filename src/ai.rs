//! AI chat proxy.
//!
//! Delegates visitor questions to the configured language-model provider.
//! Chat is advisory, not a system of record: any provider failure (quota
//! exhaustion and rate limits included) falls back to a deterministic,
//! keyword-matched canned reply in the visitor's locale instead of surfacing
//! an error. The reply string is never empty.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::locale::Locale;
use crate::retry::{with_retry, RetryConfig};

const AI_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed contact block appended to every canned reply.
pub const CONTACT_SIGNATURE: &str =
    "\n\n--\nAstra Software\ncontact@astrasoftware.io | https://astrasoftware.io";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Produce a reply for a visitor message. Never fails and never returns an
/// empty string.
pub async fn generate_reply(config: &Config, message: &str, locale: Locale) -> String {
    if !config.ai_configured() {
        debug!("AI provider not configured; using canned reply");
        return fallback_reply(message, locale);
    }

    let attempt = with_retry(&RetryConfig::ai_call(), "ai chat", || {
        call_provider(config, message, locale)
    })
    .await;

    match attempt {
        Ok(reply) if !reply.trim().is_empty() => reply,
        Ok(_) => fallback_reply(message, locale),
        Err(e) => {
            warn!("AI provider call failed, using canned reply: {:#}", e);
            fallback_reply(message, locale)
        }
    }
}

/// One provider call. Quota and rate-limit responses surface as errors so
/// the caller can fall back.
async fn call_provider(config: &Config, message: &str, locale: Locale) -> Result<String> {
    let api_key = config
        .openai_api_key
        .as_deref()
        .context("AI provider key missing")?;

    let system_prompt = format!(
        "You are the website assistant for Astra Software, a software services \
         company. Answer questions about the company, its services, use cases, \
         and careers. Be concise and friendly. Reply in {}.",
        locale.native_name()
    );

    let request = ChatRequest {
        model: config.openai_model.clone(),
        messages: vec![
            Message {
                role: "system".to_string(),
                content: system_prompt,
            },
            Message {
                role: "user".to_string(),
                content: message.to_string(),
            },
        ],
        max_tokens: 500,
        temperature: 0.7,
    };

    let client = reqwest::Client::builder()
        .timeout(AI_TIMEOUT)
        .build()
        .context("Failed to build AI HTTP client")?;

    let response = client
        .post(format!(
            "{}/v1/chat/completions",
            config.openai_api_base.trim_end_matches('/')
        ))
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await
        .context("Failed to send request to AI provider")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("AI provider error ({}): {}", status, body);
    }

    let chat_response: ChatResponse = response
        .json()
        .await
        .context("Failed to parse AI provider response")?;

    Ok(chat_response
        .choices
        .first()
        .map(|c| c.message.content.clone())
        .unwrap_or_default())
}

/// Canned replies for one locale.
struct ChatStrings {
    services: &'static str,
    pricing: &'static str,
    careers: &'static str,
    contact: &'static str,
    greeting: &'static str,
    fallback: &'static str,
}

const ENGLISH_STRINGS: ChatStrings = ChatStrings {
    services: "We build custom software: web platforms, mobile apps, and cloud \
               integrations. Take a look at our use cases for concrete examples.",
    pricing: "Pricing depends on project scope. Send us a short description of \
              what you need and we will get back to you with an estimate.",
    careers: "We are always happy to meet good engineers. Open positions are \
              listed on the careers page, or just send us your CV.",
    contact: "You can reach us by email or through the contact form on the site.",
    greeting: "Hello! Ask me anything about our services, use cases, or careers.",
    fallback: "Thanks for your message! A teammate will follow up shortly. In \
               the meantime, feel free to browse our blog and use cases.",
};

const VIETNAMESE_STRINGS: ChatStrings = ChatStrings {
    services: "Chúng tôi xây dựng phần mềm theo yêu cầu: nền tảng web, ứng dụng \
               di động và tích hợp đám mây. Mời bạn xem các use case của chúng tôi.",
    pricing: "Chi phí phụ thuộc vào phạm vi dự án. Hãy gửi mô tả ngắn về nhu cầu \
              của bạn, chúng tôi sẽ phản hồi với báo giá.",
    careers: "Chúng tôi luôn chào đón các kỹ sư giỏi. Các vị trí đang tuyển được \
              đăng trên trang tuyển dụng, hoặc bạn có thể gửi CV cho chúng tôi.",
    contact: "Bạn có thể liên hệ qua email hoặc biểu mẫu liên hệ trên trang web.",
    greeting: "Xin chào! Bạn có thể hỏi tôi về dịch vụ, use case hoặc tuyển dụng.",
    fallback: "Cảm ơn tin nhắn của bạn! Đội ngũ của chúng tôi sẽ phản hồi sớm. \
               Trong lúc chờ, mời bạn xem blog và các use case.",
};

const JAPANESE_STRINGS: ChatStrings = ChatStrings {
    services: "私たちはWebプラットフォーム、モバイルアプリ、クラウド連携などの\
               カスタムソフトウェアを開発しています。導入事例をご覧ください。",
    pricing: "料金はプロジェクトの規模によります。ご要望を簡単にお知らせいただければ、\
              お見積りをお送りします。",
    careers: "優秀なエンジニアをいつでも歓迎しています。採用ページをご覧いただくか、\
              履歴書をお送りください。",
    contact: "メールまたはサイトのお問い合わせフォームからご連絡いただけます。",
    greeting: "こんにちは！サービス、導入事例、採用について何でも聞いてください。",
    fallback: "メッセージありがとうございます！担当者より追ってご連絡いたします。\
               よろしければブログと導入事例もご覧ください。",
};

fn strings_for(locale: Locale) -> &'static ChatStrings {
    match locale {
        Locale::En => &ENGLISH_STRINGS,
        Locale::Vi => &VIETNAMESE_STRINGS,
        Locale::Ja => &JAPANESE_STRINGS,
    }
}

/// Deterministic keyword-matched reply, always ending with the contact
/// signature block.
pub fn fallback_reply(message: &str, locale: Locale) -> String {
    let strings = strings_for(locale);
    let lowered = message.to_lowercase();

    let matches_any =
        |keywords: &[&str]| keywords.iter().any(|keyword| lowered.contains(keyword));

    let reply = if matches_any(&["price", "pricing", "cost", "quote", "giá", "báo giá", "料金", "費用"]) {
        strings.pricing
    } else if matches_any(&["career", "job", "hiring", "recruit", "tuyển", "採用", "求人"]) {
        strings.careers
    } else if matches_any(&["contact", "email", "phone", "reach", "liên hệ", "連絡", "問い合わせ"]) {
        strings.contact
    } else if matches_any(&["service", "offer", "product", "do", "build", "dịch vụ", "サービス", "事業"]) {
        strings.services
    } else if matches_any(&["hello", "hi", "hey", "xin chào", "chào", "こんにちは"]) {
        strings.greeting
    } else {
        strings.fallback
    };

    format!("{}{}", reply, CONTACT_SIGNATURE)
}
