use reqwest::Client;
use serde_json::json;

pub struct Email {
    pub api_key: String,
    pub from: String,
    pub base_url: String,
}

impl Email {
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), String> {
        if self.api_key.is_empty() {
            // Log but don't fail in development
            println!("Email would be sent to {to}: {subject}");
            return Ok(());
        }

        let res = Client::new()
            .post("https://api.resend.com/emails")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": subject,
                "html": html
            }))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if res.status().is_success() {
            Ok(())
        } else {
            Err(res.text().await.unwrap_or_default())
        }
    }

    /// The link goes through the server-side redirect route, which consumes
    /// the token and bounces the browser to the verification page with the
    /// outcome in the query string.
    pub async fn send_verification(&self, to: &str, token: &str) -> Result<(), String> {
        let url = format!("{}/api/verify-email?token={}", self.base_url, token);
        self.send(
            to,
            "Verify your email - Parley",
            &format!(
                r#"
                <div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
                    <h2>Welcome to Parley!</h2>
                    <p>Please verify your email address by clicking the button below:</p>
                    <p style="margin: 30px 0;">
                        <a href="{url}" style="background: #2563eb; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px;">
                            Verify Email
                        </a>
                    </p>
                    <p style="color: #666; font-size: 14px;">
                        Or copy this link: <a href="{url}">{url}</a>
                    </p>
                    <p style="color: #666; font-size: 14px;">This link expires in 24 hours.</p>
                </div>
                "#
            ),
        )
        .await
    }
}
