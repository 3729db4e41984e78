pub mod console {
    pub mod checkout_prompt;
}

pub mod csv {
    pub mod ticket_writer;
}
