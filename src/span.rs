use actix::dev::MessageResponse;
use actix::prelude::*;
use async_trait::async_trait;
use pin_project::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::Span;

/// Actor message carrying the sender's span, so work done on the receiving
/// side of a mailbox is logged under the request that caused it.
pub struct SpanMessage<M> {
    pub msg: M,
    pub span: Span,
}

impl<M> SpanMessage<M> {
    pub fn new(msg: M) -> Self {
        Self::with_span(msg, Span::current())
    }

    pub fn with_span(msg: M, span: Span) -> Self {
        Self { msg, span }
    }
}

impl<M, R: 'static> Message for SpanMessage<M>
where
    M: Message<Result = R>,
{
    type Result = R;
}

pub trait SpanHandler<M>
where
    Self: Actor,
    M: Message,
{
    type Result: MessageResponse<Self, M>;

    fn handle(&mut self, msg: M, ctx: &mut Self::Context, span: Span) -> Self::Result;
}

/// Handler that needs nothing from the actor besides what `with_ctx` gives it.
#[async_trait]
pub trait AsyncSpanHandler<M>
where
    Self: Actor,
    M: Message,
{
    async fn handle(msg: M) -> <M as Message>::Result;
}

/// Enters the span every time the wrapped actor future is polled.
#[pin_project]
#[derive(Debug)]
pub struct ActorFutureSpanWrap<F> {
    #[pin]
    inner: F,
    span: Span,
}

impl<F: ActorFuture> ActorFutureSpanWrap<F> {
    pub fn new(inner: F, span: Span) -> Self {
        Self { inner, span }
    }
}

impl<F: ActorFuture> ActorFuture for ActorFutureSpanWrap<F> {
    type Actor = F::Actor;
    type Output = F::Output;

    fn poll(
        self: Pin<&mut Self>,
        actor: &mut Self::Actor,
        ctx: &mut <Self::Actor as Actor>::Context,
        task: &mut Context,
    ) -> Poll<Self::Output> {
        let this = self.project();
        let _enter = this.span.enter();
        this.inner.poll(actor, ctx, task)
    }
}

#[macro_export]
macro_rules! span_message_impl {
    ($message_type:ident, $actor:ident) => {
        impl Handler<$crate::span::SpanMessage<$message_type>> for $actor {
            type Result = ResponseActFuture<Self, <$message_type as Message>::Result>;
            fn handle(
                &mut self,
                msg: $crate::span::SpanMessage<$message_type>,
                ctx: &mut Context<Self>,
            ) -> Self::Result {
                let $crate::span::SpanMessage { span, msg } = msg;
                let _enter = span.enter();
                tracing::trace!(message = stringify!($message_type), "Handling span message");
                Box::new($crate::span::ActorFutureSpanWrap::new(
                    <Self as $crate::span::SpanHandler<$message_type>>::handle(
                        self,
                        msg,
                        ctx,
                        span.clone(),
                    ),
                    span.clone(),
                ))
            }
        }
    };
}

#[macro_export]
macro_rules! message_handler_with_span {
    (impl SpanHandler<$M:ident> for $A:ident $t:tt) => {
        $crate::span_message_impl!($M, $A);
        impl $crate::span::SpanHandler<$M> for $A
            $t
    }
}

// Paths are spelled out so the macro can be used several times in one module.
#[macro_export]
macro_rules! span_message_async_impl {
    ($message_type:ident, $actor:ident) => {
        impl Handler<$crate::span::SpanMessage<$message_type>> for $actor {
            type Result = ResponseActFuture<Self, <$message_type as Message>::Result>;
            fn handle(
                &mut self,
                msg: $crate::span::SpanMessage<$message_type>,
                _ctx: &mut Context<Self>,
            ) -> Self::Result {
                let $crate::span::SpanMessage { span, msg } = msg;
                let _enter = span.enter();
                let fut = tracing_futures::Instrument::in_current_span(
                    <Self as $crate::span::AsyncSpanHandler<$message_type>>::handle(msg),
                );
                actix_interop::FutureInterop::interop_actor_boxed(fut, self)
            }
        }
    };
}

#[macro_export]
macro_rules! async_message_handler_with_span {
    (impl AsyncSpanHandler<$M:ident> for $A:ident $t:tt) => {
        $crate::span_message_async_impl!($M, $A);
        #[async_trait::async_trait]
        impl $crate::span::AsyncSpanHandler<$M> for $A
            $t
    }
}
