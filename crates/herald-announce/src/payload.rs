use serde::Serialize;

use crate::{
    Channel, DeploymentOutcome, Status,
    format::{duration_display, size_display, transaction_display},
};

const SUCCESS_COLOR: u32 = 0x2E_CC_71;
const FAILURE_COLOR: u32 = 0xE7_4C_3C;
const NO_CHANGE_COLOR: u32 = 0x95_A5_A6;

/// Configuration the renderer needs that doesn't come from the outcome itself.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AnnounceSettings {
    /// The name the deployment's undernames live under.
    pub owner_namespace: String,
    /// How many applications live under `owner_namespace`.
    pub total_apps: u64,
    /// Host that serves names, e.g. `ar.io`.
    pub gateway: String,
}

impl Default for AnnounceSettings {
    fn default() -> Self {
        Self {
            owner_namespace: String::from("unknown"),
            total_apps: 0,
            gateway: String::from("ar.io"),
        }
    }
}

impl AnnounceSettings {
    /// Where a deployment published under `undername` can be reached.
    #[must_use]
    pub fn undername_url(&self, undername: &str) -> String {
        format!("https://{undername}_{}.{}", self.owner_namespace, self.gateway)
    }

    /// Where the namespace itself can be reached.
    #[must_use]
    pub fn root_url(&self) -> String {
        format!("https://{}.{}", self.owner_namespace, self.gateway)
    }
}

/// The rendered announcement, shaped for the channel it's going to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Payload {
    Social(SocialPost),
    Chat(ChatMessage),
}

/// Plain text for a public post or a direct message.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SocialPost {
    pub text: String,
}

/// An incoming-webhook message body with a single embed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ChatMessage {
    pub username: String,
    pub embeds: Vec<Embed>,
}

impl ChatMessage {
    /// The link attached to the message, if the deployment can be visited.
    #[must_use]
    pub fn deployment_url(&self) -> Option<&str> {
        self.embeds.first().and_then(|embed| embed.url.as_deref())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub color: u32,
    pub fields: Vec<EmbedField>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            inline: true,
        }
    }
}

/// Render `outcome` for `channel`. Rebuilt from scratch on every call.
#[must_use]
pub fn render(outcome: &DeploymentOutcome, channel: &Channel, settings: &AnnounceSettings) -> Payload {
    match channel {
        Channel::PublicPost | Channel::DirectMessage { .. } => Payload::Social(social_post(outcome)),
        Channel::ChatWebhook => Payload::Chat(chat_message(outcome, settings)),
    }
}

fn social_post(outcome: &DeploymentOutcome) -> SocialPost {
    if outcome.is_no_change_event() {
        return SocialPost {
            text: String::from("ℹ️ No changes to deploy. Nothing was published."),
        };
    }
    let status = outcome.status();
    let text = format!(
        "{glyph} Deployment {word}!\n\
         \n\
         File: {file}\n\
         Undername: {hash}\n\
         Transaction: {tx}\n\
         Size: {size}\n\
         Duration: {duration}",
        glyph = status.glyph(),
        word = status.word(),
        file = outcome.file_path(),
        hash = outcome.identifier_hash(),
        tx = transaction_display(outcome.transaction_id()),
        size = size_display(outcome.file_size_bytes()),
        duration = duration_display(outcome.duration_ms()),
    );
    SocialPost { text }
}

fn chat_message(outcome: &DeploymentOutcome, settings: &AnnounceSettings) -> ChatMessage {
    let namespace_fields = [
        EmbedField::new("ARNS Name", settings.owner_namespace.clone()),
        EmbedField::new("Total Apps", settings.total_apps.to_string()),
    ];

    let embed = if outcome.is_no_change_event() {
        Embed {
            title: String::from("No Changes Detected"),
            description: String::from(
                "ℹ️ Nothing changed since the last deployment, so no deployment occurred.",
            ),
            url: Some(settings.root_url()),
            color: NO_CHANGE_COLOR,
            fields: namespace_fields.into(),
        }
    } else {
        let status = outcome.status();
        let mut fields = vec![
            EmbedField::new("File", outcome.file_path()),
            EmbedField::new("Undername", outcome.identifier_hash()),
            EmbedField::new("Manifest TX", transaction_display(outcome.transaction_id())),
            EmbedField::new("Size", size_display(outcome.file_size_bytes())),
            EmbedField::new("Duration", duration_display(outcome.duration_ms())),
        ];
        fields.extend(namespace_fields);
        Embed {
            title: status.title().to_string(),
            description: format!("{} Deployment {}", status.glyph(), status.word()),
            url: (status == Status::Success)
                .then(|| settings.undername_url(outcome.identifier_hash())),
            color: match status {
                Status::Success => SUCCESS_COLOR,
                Status::Failure => FAILURE_COLOR,
            },
            fields,
        }
    };

    ChatMessage {
        username: String::from("herald"),
        embeds: vec![embed],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test_render {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::NO_CHANGE_SENTINEL;

    fn settings() -> AnnounceSettings {
        AnnounceSettings {
            owner_namespace: String::from("myapp"),
            total_apps: 7,
            gateway: String::from("ar.io"),
        }
    }

    fn outcome() -> DeploymentOutcome {
        DeploymentOutcome::builder("deadbeef")
            .file_path(Some("hello-world.txt".to_string()))
            .transaction_id(Some("abcdefghij".to_string()))
            .file_size_bytes(31337)
            .duration_ms(10)
            .build()
            .unwrap()
    }

    fn field_names(message: &ChatMessage) -> Vec<&str> {
        message.embeds[0]
            .fields
            .iter()
            .map(|field| field.name.as_str())
            .collect()
    }

    #[test]
    fn social_text() {
        let Payload::Social(post) = render(&outcome(), &Channel::PublicPost, &settings()) else {
            panic!("expected a social post");
        };

        assert_eq!(
            post.text,
            "✅ Deployment succeeded!\n\
             \n\
             File: hello-world.txt\n\
             Undername: deadbeef\n\
             Transaction: abcdefgh...\n\
             Size: 30.6 KB\n\
             Duration: 10ms"
        );
    }

    #[test]
    fn direct_message_uses_same_text() {
        let dm = Channel::DirectMessage {
            recipient: "jonniesparkles".to_string(),
        };

        assert_eq!(
            render(&outcome(), &dm, &settings()),
            render(&outcome(), &Channel::PublicPost, &settings())
        );
    }

    #[test]
    fn failure_uses_failure_glyph_everywhere() {
        let failed = DeploymentOutcome::builder("deadbeef")
            .succeeded(false)
            .build()
            .unwrap();

        let Payload::Social(post) = render(&failed, &Channel::PublicPost, &settings()) else {
            panic!("expected a social post");
        };
        assert!(post.text.starts_with("❌ Deployment failed!"));
        assert!(post.text.contains("Transaction: N/A"));

        let Payload::Chat(message) = render(&failed, &Channel::ChatWebhook, &settings()) else {
            panic!("expected a chat message");
        };
        let embed = &message.embeds[0];
        assert_eq!(embed.title, "Deployment Failed");
        assert_eq!(embed.description, "❌ Deployment failed");
        assert_eq!(embed.color, FAILURE_COLOR);
        assert_eq!(message.deployment_url(), None);
    }

    #[test]
    fn chat_fields() {
        let Payload::Chat(message) = render(&outcome(), &Channel::ChatWebhook, &settings()) else {
            panic!("expected a chat message");
        };

        assert_eq!(
            field_names(&message),
            [
                "File",
                "Undername",
                "Manifest TX",
                "Size",
                "Duration",
                "ARNS Name",
                "Total Apps"
            ]
        );
        assert_eq!(message.deployment_url(), Some("https://deadbeef_myapp.ar.io"));
    }

    #[test]
    fn chat_no_change_template() {
        let no_change = DeploymentOutcome::builder(NO_CHANGE_SENTINEL)
            .file_size_bytes(31337)
            .duration_ms(10)
            .build()
            .unwrap();

        let Payload::Chat(message) = render(&no_change, &Channel::ChatWebhook, &settings()) else {
            panic!("expected a chat message");
        };

        let embed = &message.embeds[0];
        assert_eq!(embed.title, "No Changes Detected");
        assert_eq!(field_names(&message), ["ARNS Name", "Total Apps"]);
        assert_eq!(embed.fields[0].value, "myapp");
        assert_eq!(embed.fields[1].value, "7");
        assert_eq!(message.deployment_url(), Some("https://myapp.ar.io"));
    }

    #[test]
    fn chat_serializes_as_webhook_body() {
        let Payload::Chat(message) = render(&outcome(), &Channel::ChatWebhook, &settings()) else {
            panic!("expected a chat message");
        };

        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["username"], "herald");
        assert_eq!(json["embeds"][0]["title"], "Deployment Succeeded");
        assert_eq!(json["embeds"][0]["color"], SUCCESS_COLOR);
        assert_eq!(json["embeds"][0]["fields"][0]["name"], "File");
        assert_eq!(json["embeds"][0]["fields"][0]["inline"], true);
    }
}
