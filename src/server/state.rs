use crate::backend::TranslationBackend;
use crate::fulfillment::Fulfillment;

pub(crate) struct ServerState<B: TranslationBackend> {
    pub(crate) fulfillment: Fulfillment<B>,
}
