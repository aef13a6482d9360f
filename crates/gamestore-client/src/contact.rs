use crate::app::Context;

pub const CONTACT_ACK: &str = "Thank you for contacting admin!";

/// Storefront contact form. Nothing is sent anywhere.
pub struct ContactHandler {
    ctx: Context,
}

impl ContactHandler {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn submit(&self) {
        self.ctx.surface.alert(CONTACT_ACK);
        self.ctx.surface.reset_contact_form();
    }
}
