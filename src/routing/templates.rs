//! Canned response and thread-title pools.
//!
//! Templates use `%`-placeholders that are substituted at send time:
//! `%mention` (user mention markup), `%user` (account name),
//! `%display` (display name) and `%guild` (guild name).

use rand::Rng;

use crate::common::{GuildRef, UserRef};

/// Maximum length of a Discord thread name, in characters.
pub const MAX_THREAD_NAME_LEN: usize = 100;

/// A fixed, non-empty set of templates.
#[derive(Debug, Clone, Copy)]
pub struct Pool(&'static [&'static str]);

impl Pool {
    /// Panics at compile time when used in a `const` with an empty slice.
    pub const fn new(templates: &'static [&'static str]) -> Self {
        assert!(!templates.is_empty(), "template pool must not be empty");
        Self(templates)
    }

    /// Pick one template uniformly at random.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        self.0[rng.gen_range(0..self.0.len())]
    }

    #[cfg(test)]
    pub fn templates(&self) -> &'static [&'static str] {
        self.0
    }
}

/// Values substituted into a template.
#[derive(Debug, Clone)]
pub struct TemplateVars<'a> {
    pub mention: String,
    pub user: &'a str,
    pub display: &'a str,
    pub guild: &'a str,
}

impl<'a> TemplateVars<'a> {
    pub fn new(user: &'a UserRef, guild_name: &'a str) -> Self {
        Self {
            mention: user.mention(),
            user: &user.name,
            display: &user.display_name,
            guild: guild_name,
        }
    }

    pub fn for_member(user: &'a UserRef, guild: &'a GuildRef) -> Self {
        Self::new(user, &guild.name)
    }
}

/// Substitute every placeholder in `template`.
///
/// Single pass, so substituted values are never rescanned for placeholders.
pub fn render(template: &str, vars: &TemplateVars<'_>) -> String {
    let placeholders: [(&str, &str); 4] = [
        ("%mention", &vars.mention),
        ("%display", vars.display),
        ("%user", vars.user),
        ("%guild", vars.guild),
    ];

    let mut result = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(pos) = rest.find('%') {
        result.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match placeholders.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                result.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                result.push('%');
                rest = &tail[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

/// Render a thread title and clamp it to Discord's thread name limit.
pub fn render_title(template: &str, vars: &TemplateVars<'_>) -> String {
    let title = render(template, vars);
    if title.chars().count() <= MAX_THREAD_NAME_LEN {
        title
    } else {
        title.chars().take(MAX_THREAD_NAME_LEN).collect()
    }
}

/// Pools for one thread route (questions channel or bot mention).
#[derive(Debug, Clone, Copy)]
pub struct ThreadPools {
    pub titles: Pool,
    pub responses: Pool,
    pub no_permission: Pool,
    pub error: Pool,
}

/// All template pools the dispatcher draws from.
#[derive(Debug, Clone, Copy)]
pub struct TemplateBank {
    pub welcome: Pool,
    pub goodbye: Pool,
    pub question: ThreadPools,
    pub mention: ThreadPools,
}

impl Default for TemplateBank {
    fn default() -> Self {
        Self {
            welcome: WELCOME,
            goodbye: GOODBYE,
            question: ThreadPools {
                titles: QUESTION_TITLES,
                responses: QUESTION_RESPONSES,
                no_permission: QUESTION_NO_PERMISSION,
                error: QUESTION_ERROR,
            },
            mention: ThreadPools {
                titles: MENTION_TITLES,
                responses: MENTION_RESPONSES,
                no_permission: MENTION_NO_PERMISSION,
                error: MENTION_ERROR,
            },
        }
    }
}

#[cfg(test)]
impl TemplateBank {
    /// Every pool, labelled.
    pub fn pools(&self) -> [(&'static str, Pool); 10] {
        [
            ("welcome", self.welcome),
            ("goodbye", self.goodbye),
            ("question_titles", self.question.titles),
            ("question_responses", self.question.responses),
            ("question_no_permission", self.question.no_permission),
            ("question_error", self.question.error),
            ("mention_titles", self.mention.titles),
            ("mention_responses", self.mention.responses),
            ("mention_no_permission", self.mention.no_permission),
            ("mention_error", self.mention.error),
        ]
    }
}

const WELCOME: Pool = Pool::new(&[
    "Welcome to %guild, %mention! 👋 We're glad you're here!",
    "Hey there %mention! 🎉 Welcome to our awesome community!",
    "🌟 Welcome %mention! Hope you enjoy your time in %guild!",
    "Hello %mention! 👋 Welcome to the server! Feel free to introduce yourself!",
    "🎊 %mention just joined! Welcome to %guild!",
    "Welcome aboard %mention! 🚀 You're now part of our community!",
    "Hey %mention! 😊 Welcome to %guild! Make yourself at home!",
    "🎈 A warm welcome to %mention! We're excited to have you here!",
]);

const GOODBYE: Pool = Pool::new(&[
    "Goodbye %user! 👋 Thanks for being part of our community!",
    "Farewell %user! 🌟 Hope to see you again someday!",
    "See you later %user! 👋 You'll be missed!",
    "%user has left the server. Thanks for the memories! 💫",
    "Goodbye %user! 🚪 The door is always open if you want to return!",
    "Farewell %user! 👋 Wishing you all the best!",
    "%user just left. Thanks for being awesome! ✨",
]);

const QUESTION_TITLES: Pool = Pool::new(&[
    "❓ %user's Question",
    "🤔 Help Request - %user",
    "💭 Question from %display",
    "🔍 %user needs help",
    "❓ Discussion with %user",
    "🆘 Support for %display",
    "💬 %user's Thread",
    "🧠 Question Time - %user",
    "🤝 Helping %display",
    "❓ %user's Support Thread",
]);

const QUESTION_RESPONSES: Pool = Pool::new(&[
    "Hi %mention! 👋 I've created this thread for your question. Let's discuss it here!",
    "Hello %mention! 🤔 I saw your question and made a thread so we can help you properly!",
    "Hey %mention! ❓ This thread is dedicated to answering your question. Fire away!",
    "Welcome %mention! 🆘 I've set up this space for your support request. How can we help?",
    "Hi there %mention! 💭 Let's dive into your question in this dedicated thread!",
    "Hello %mention! 🔍 I've created a focused discussion space for your question!",
]);

const QUESTION_NO_PERMISSION: Pool = Pool::new(&[
    "Hi %mention! 👋 I'd love to create a thread for your question, but I don't have permission to do so.",
]);

const QUESTION_ERROR: Pool = Pool::new(&[
    "Hi %mention! 👋 I see your question! Something went wrong creating a thread, but I'm here to help!",
]);

const MENTION_TITLES: Pool = Pool::new(&[
    "Chat with %user",
    "Discussion with %display",
    "%user's Help Thread",
    "Conversation - %user",
    "Support Thread for %user",
    "Chat Room - %display",
    "%user's Discussion",
    "Help Desk - %user",
    "Thread for %display",
    "Private Chat with %user",
]);

const MENTION_RESPONSES: Pool = Pool::new(&[
    "Hey %mention! 👋 I've created this thread for our conversation!",
    "Hello there, %mention! How can I help you in this thread?",
    "You called, %mention? 🤖 Let's chat here!",
    "What's up, %mention? 😊 This is our private discussion space!",
    "Hi %mention! I've made a thread just for us to talk! 💬",
]);

const MENTION_NO_PERMISSION: Pool = Pool::new(&[
    "Hey %mention! 👋 I'd love to create a thread for us, but I don't have permission to do so.",
]);

const MENTION_ERROR: Pool = Pool::new(&[
    "Hey %mention! 👋 Something went wrong, but I'm here to help!",
]);
