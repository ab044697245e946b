use crate::{
  observable::Observable, observer::Observer, scheduler::Scheduler, subscriber::Subscriber,
  subscription::Subscription,
};

/// Subscribes to the source from a task spawned on a scheduler, so a
/// synchronous source produces on that scheduler instead of the caller.
#[derive(Clone)]
pub struct SubscribeOn<S, SD> {
  pub(crate) source: S,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for SubscribeOn<S, SD>
where
  S: Observable + Send + 'static,
  SD: Scheduler,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let subscription = subscriber.subscription().clone();
    let source = self.source;
    let handle = self.scheduler.spawn(async move {
      source.actual_subscribe(subscriber);
    });
    subscription.add(handle);
    subscription
  }
}
