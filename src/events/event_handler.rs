/// Implemented by engines that consume a stream of commands.
pub trait EventHandler<T> {
    fn handle_event(&mut self, event: &T);
}
