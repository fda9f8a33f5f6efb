use anyhow::Result;

use crate::core::AppConfig;
use crate::openai::{
    ChatCompletion, Client, CompletionError, CompletionRequest, ContentPart, GenerationParams,
    HttpLogger, Message, Role,
};

pub const DEFAULT_IMAGE_URL: &str =
    "https://d2r55xnwy6nx47.cloudfront.net/uploads/2018/02/Ants_Lede1300.jpg";
pub const DEFAULT_PROMPT: &str = "What is shown in this image?";

/// A single user message with the image first and the question second.
pub fn describe_request(
    params: &GenerationParams,
    image_url: &str,
    prompt: &str,
) -> CompletionRequest {
    let message = Message::new_with_parts(
        Role::User,
        vec![ContentPart::image_url(image_url), ContentPart::text(prompt)],
    );
    CompletionRequest::new(params, vec![message])
}

/// Returns the raw reply text. Unlike chat, sentinels are left as is.
pub async fn describe<C: ChatCompletion>(
    client: &C,
    params: &GenerationParams,
    image_url: &str,
    prompt: &str,
) -> Result<String, CompletionError> {
    let request = describe_request(params, image_url, prompt);
    let completion = client.complete(&request).await?;
    Ok(completion.content)
}

pub async fn run(
    config: &AppConfig,
    model: &str,
    image_url: &str,
    prompt: &str,
    log_http: bool,
) -> Result<()> {
    let mut client = Client::new(&config.api_base_url, &config.api_key, config.request_timeout);
    if log_http {
        client = client.with_observer(Box::new(HttpLogger));
    }

    let params = GenerationParams::vision(model);
    let content = describe(&client, &params, image_url, prompt).await?;
    println!("{}", content);

    Ok(())
}
