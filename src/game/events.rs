use std::cell::RefCell;
use std::rc::Rc;

use super::state::GameEvent;

/// 订阅引擎事件的观察者。
pub trait GameObserver {
    fn on_event(&mut self, event: &GameEvent);
}

impl<T: GameObserver + ?Sized> GameObserver for Rc<RefCell<T>> {
    fn on_event(&mut self, event: &GameEvent) {
        self.borrow_mut().on_event(event);
    }
}

/// Delivers every published event to all subscribers, in subscription order.
#[derive(Default)]
pub struct EventBus {
    observers: Vec<Box<dyn GameObserver>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl GameObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn publish(&mut self, event: &GameEvent) {
        for observer in &mut self.observers {
            observer.on_event(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::PlayerId;

    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<(&'static str, GameEvent)>>>,
    }

    impl GameObserver for Recorder {
        fn on_event(&mut self, event: &GameEvent) {
            self.log.borrow_mut().push((self.name, event.clone()));
        }
    }

    #[test]
    fn publish_reaches_subscribers_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        bus.subscribe(Recorder {
            name: "first",
            log: Rc::clone(&log),
        });
        bus.subscribe(Recorder {
            name: "second",
            log: Rc::clone(&log),
        });

        let event = GameEvent::TurnChanged {
            active_player: PlayerId::Two,
        };
        bus.publish(&event);

        assert_eq!(
            *log.borrow(),
            vec![("first", event.clone()), ("second", event)]
        );
    }

    #[test]
    fn shared_observer_stays_readable() {
        struct Counter(usize);
        impl GameObserver for Counter {
            fn on_event(&mut self, _event: &GameEvent) {
                self.0 += 1;
            }
        }

        let counter = Rc::new(RefCell::new(Counter(0)));
        let mut bus = EventBus::new();
        bus.subscribe(Rc::clone(&counter));
        bus.publish(&GameEvent::Reset);
        bus.publish(&GameEvent::Reset);

        assert_eq!(counter.borrow().0, 2);
    }
}
