//! Language middleware for event handlers.
//!
//! [`LanguageLayer`] runs before a handler: it finds the event's chat, leaves
//! blacklisted chats without running the handler, and otherwise hands the
//! handler a [`LocalizedEvent`] carrying the chat's language pack.

use crate::i18n::{LanguagePack, ResolveError, Resolver};
use crate::store::LanguageStore;
use crate::telegram::{Chat, ChatActions, Event};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MiddlewareError {
    #[error("event is not attached to a chat")]
    UnresolvedChat,

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to leave blacklisted chat {chat_id}")]
    Leave {
        chat_id: i64,
        #[source]
        source: anyhow::Error,
    },

    #[error("handler failed")]
    Handler(#[source] anyhow::Error),
}

/// What happened to an event that went through the layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The handler ran and returned this value.
    Handled(T),
    /// The chat is blacklisted; the bot left it and the handler did not run.
    Left,
}

impl<T> Outcome<T> {
    pub fn is_left(&self) -> bool {
        matches!(self, Outcome::Left)
    }

    pub fn handled(self) -> Option<T> {
        match self {
            Outcome::Handled(value) => Some(value),
            Outcome::Left => None,
        }
    }
}

/// An event together with its chat and the chat's language pack.
#[derive(Debug, Clone)]
pub struct LocalizedEvent {
    event: Event,
    chat: Chat,
    lang: Arc<LanguagePack>,
}

impl LocalizedEvent {
    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn chat(&self) -> &Chat {
        &self.chat
    }

    pub fn lang(&self) -> &LanguagePack {
        &self.lang
    }

    /// Shared handle to the language pack.
    pub fn lang_handle(&self) -> Arc<LanguagePack> {
        Arc::clone(&self.lang)
    }

    pub fn text(&self) -> Option<&str> {
        self.event.text()
    }
}

/// Something that handles a localized event.
///
/// Implemented for plain async closures as well, so
/// `|ctx: LocalizedEvent| async move { ... }` can be wrapped directly.
#[async_trait]
pub trait Handler: Send + Sync {
    type Output: Send;

    async fn handle(&self, ctx: LocalizedEvent) -> anyhow::Result<Self::Output>;
}

#[async_trait]
impl<F, Fut, T> Handler for F
where
    F: Fn(LocalizedEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    async fn handle(&self, ctx: LocalizedEvent) -> anyhow::Result<T> {
        (self)(ctx).await
    }
}

/// Blacklist gate and language lookup in front of handlers.
pub struct LanguageLayer<S, A> {
    resolver: Resolver<S>,
    actions: Arc<A>,
}

impl<S, A> LanguageLayer<S, A>
where
    S: LanguageStore,
    A: ChatActions,
{
    pub fn new(resolver: Resolver<S>, actions: Arc<A>) -> Self {
        Self { resolver, actions }
    }

    pub fn resolver(&self) -> &Resolver<S> {
        &self.resolver
    }

    /// Run `handler` for `event` unless its chat is blacklisted.
    ///
    /// For a blacklisted chat the bot leaves it exactly once and returns
    /// [`Outcome::Left`]. Resolution and handler failures propagate.
    pub async fn call<H>(
        &self,
        event: Event,
        handler: &H,
    ) -> Result<Outcome<H::Output>, MiddlewareError>
    where
        H: Handler + ?Sized,
    {
        let chat = event
            .chat()
            .cloned()
            .ok_or(MiddlewareError::UnresolvedChat)?;

        if self.resolver.store().is_blacklisted(chat.id) {
            info!("Chat {} is blacklisted, leaving", chat.id);
            self.actions
                .leave_chat(chat.id)
                .await
                .map_err(|source| MiddlewareError::Leave {
                    chat_id: chat.id,
                    source,
                })?;
            return Ok(Outcome::Left);
        }

        let lang = self.resolver.resolve(chat.id).await?;
        let ctx = LocalizedEvent { event, chat, lang };

        handler
            .handle(ctx)
            .await
            .map(Outcome::Handled)
            .map_err(MiddlewareError::Handler)
    }

    /// Bind `handler` behind this layer.
    pub fn wrap<H: Handler>(self: &Arc<Self>, handler: H) -> Localized<S, A, H> {
        Localized {
            layer: Arc::clone(self),
            handler: Arc::new(handler),
        }
    }
}

/// A handler bound to a [`LanguageLayer`].
pub struct Localized<S, A, H> {
    layer: Arc<LanguageLayer<S, A>>,
    handler: Arc<H>,
}

impl<S, A, H> Clone for Localized<S, A, H> {
    fn clone(&self) -> Self {
        Self {
            layer: Arc::clone(&self.layer),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<S, A, H> Localized<S, A, H>
where
    S: LanguageStore,
    A: ChatActions,
    H: Handler,
{
    pub async fn dispatch(&self, event: Event) -> Result<Outcome<H::Output>, MiddlewareError> {
        self.layer.call(event, self.handler.as_ref()).await
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Catalog;
    use crate::store::MemoryStore;
    use crate::telegram::{CallbackQuery, Message, User};
    use anyhow::{anyhow, bail};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingActions {
        left: Mutex<Vec<i64>>,
        fail_leave: bool,
    }

    #[async_trait]
    impl ChatActions for RecordingActions {
        async fn leave_chat(&self, chat_id: i64) -> anyhow::Result<()> {
            if self.fail_leave {
                bail!("not a member");
            }
            self.left.lock().unwrap().push(chat_id);
            Ok(())
        }

        async fn send_message(&self, _chat_id: i64, _text: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn pack(start: &str) -> LanguagePack {
        match json!({ "start": start }) {
            serde_json::Value::Object(map) => LanguagePack::new(map),
            _ => unreachable!(),
        }
    }

    fn message(chat_id: i64, text: &str) -> Event {
        Event::Message(Message {
            message_id: 1,
            from: None,
            chat: Chat {
                id: chat_id,
                r#type: "private".to_string(),
            },
            text: Some(text.to_string()),
        })
    }

    fn callback(message: Option<Message>) -> Event {
        Event::Callback(CallbackQuery {
            id: "cb".to_string(),
            from: User {
                id: 1,
                username: None,
                first_name: "Test".to_string(),
            },
            message,
            data: Some("lang:fr".to_string()),
        })
    }

    fn layer(
        store: Arc<MemoryStore>,
        actions: Arc<RecordingActions>,
    ) -> Arc<LanguageLayer<MemoryStore, RecordingActions>> {
        let catalog = Catalog::from_packs([("en", pack("Hello")), ("fr", pack("Bonjour"))]);
        let resolver = Resolver::new(Arc::new(catalog), store);
        Arc::new(LanguageLayer::new(resolver, actions))
    }

    #[tokio::test]
    async fn test_handler_receives_chat_language() {
        let store = Arc::new(MemoryStore::new());
        store.set_lang(42, "fr");
        let layer = layer(store, Arc::new(RecordingActions::default()));

        let outcome = layer
            .call(message(42, "/start"), &|ctx: LocalizedEvent| async move {
                anyhow::Ok(ctx.lang().text("start").map(str::to_string))
            })
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Handled(Some("Bonjour".to_string())));
    }

    #[tokio::test]
    async fn test_attached_pack_equals_catalog_pack() {
        let store = Arc::new(MemoryStore::new());
        store.set_lang(42, "fr");
        let layer = layer(store, Arc::new(RecordingActions::default()));
        let expected = layer.resolver().catalog().get_pack("fr").unwrap();

        let attached = layer
            .call(message(42, "hi"), &|ctx: LocalizedEvent| async move {
                anyhow::Ok(ctx.lang_handle())
            })
            .await
            .unwrap()
            .handled()
            .unwrap();

        assert_eq!(*attached, *expected);
    }

    #[tokio::test]
    async fn test_blacklisted_chat_is_left_and_handler_skipped() {
        let store = Arc::new(MemoryStore::new());
        store.blacklist(42);
        let actions = Arc::new(RecordingActions::default());
        let layer = layer(store, Arc::clone(&actions));
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let wrapped = layer.wrap(move |_ctx: LocalizedEvent| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                anyhow::Ok(())
            }
        });

        let outcome = wrapped.dispatch(message(42, "/start")).await.unwrap();

        assert!(outcome.is_left());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(*actions.left.lock().unwrap(), vec![42]);
    }

    #[tokio::test]
    async fn test_non_blacklisted_chat_runs_handler_once() {
        let store = Arc::new(MemoryStore::new());
        store.blacklist(7);
        let actions = Arc::new(RecordingActions::default());
        let layer = layer(store, Arc::clone(&actions));
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let wrapped = layer.wrap(move |_ctx: LocalizedEvent| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                anyhow::Ok(())
            }
        });

        let outcome = wrapped.dispatch(message(42, "/start")).await.unwrap();

        assert_eq!(outcome, Outcome::Handled(()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(actions.left.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_callback_resolves_chat_via_message() {
        let store = Arc::new(MemoryStore::new());
        store.set_lang(99, "fr");
        let layer = layer(store, Arc::new(RecordingActions::default()));

        let event = callback(Some(Message {
            message_id: 3,
            from: None,
            chat: Chat {
                id: 99,
                r#type: "group".to_string(),
            },
            text: None,
        }));

        let chat_id = layer
            .call(event, &|ctx: LocalizedEvent| async move { anyhow::Ok(ctx.chat().id) })
            .await
            .unwrap();
        assert_eq!(chat_id, Outcome::Handled(99));
    }

    #[tokio::test]
    async fn test_event_without_chat_is_rejected() {
        let layer = layer(
            Arc::new(MemoryStore::new()),
            Arc::new(RecordingActions::default()),
        );

        let err = layer
            .call(callback(None), &|_ctx: LocalizedEvent| async move { anyhow::Ok(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, MiddlewareError::UnresolvedChat));
    }

    #[tokio::test]
    async fn test_unknown_language_propagates() {
        let store = Arc::new(MemoryStore::new());
        store.set_lang(42, "ja");
        let layer = layer(store, Arc::new(RecordingActions::default()));

        let err = layer
            .call(message(42, "/start"), &|_ctx: LocalizedEvent| async move { anyhow::Ok(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, MiddlewareError::Resolve(ResolveError::Lookup(_))));
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let layer = layer(
            Arc::new(MemoryStore::new()),
            Arc::new(RecordingActions::default()),
        );

        let err = layer
            .call(message(1, "/start"), &|_ctx: LocalizedEvent| async move {
                Err::<(), _>(anyhow!("boom"))
            })
            .await
            .unwrap_err();
        match err {
            MiddlewareError::Handler(source) => assert_eq!(source.to_string(), "boom"),
            other => panic!("expected handler error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_leave_failure_propagates() {
        let store = Arc::new(MemoryStore::new());
        store.blacklist(5);
        let actions = Arc::new(RecordingActions {
            fail_leave: true,
            ..Default::default()
        });
        let layer = layer(store, actions);

        let err = layer
            .call(message(5, "/start"), &|_ctx: LocalizedEvent| async move { anyhow::Ok(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, MiddlewareError::Leave { chat_id: 5, .. }));
    }

    #[tokio::test]
    async fn test_handler_receives_dispatched_event() {
        let layer = layer(
            Arc::new(MemoryStore::new()),
            Arc::new(RecordingActions::default()),
        );

        let wrapped = layer.wrap(|ctx: LocalizedEvent| async move {
            match ctx.event() {
                Event::Message(message) => anyhow::Ok(message.text.clone()),
                Event::Callback(_) => bail!("expected a message event"),
            }
        });

        let outcome = wrapped.dispatch(message(3, "/start")).await.unwrap();
        assert_eq!(outcome, Outcome::Handled(Some("/start".to_string())));
    }

    #[test]
    fn test_localized_clones_share_handler() {
        let layer = layer(
            Arc::new(MemoryStore::new()),
            Arc::new(RecordingActions::default()),
        );

        let wrapped = layer.wrap(|_ctx: LocalizedEvent| async move { anyhow::Ok(()) });
        let cloned = wrapped.clone();

        assert!(std::ptr::eq(wrapped.handler(), cloned.handler()));
    }
}
