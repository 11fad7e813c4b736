// engines subscribed to a command channel hold themselves through the listener; destroy() breaks that cycle
pub trait Destroyable {
    fn destroy(&mut self);
}
