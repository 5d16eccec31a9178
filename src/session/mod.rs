//local shortcuts

//third-party shortcuts

//standard shortcuts

//-------------------------------------------------------------------------------------------------------------------

mod session;
mod state;

pub(crate) use session::S2SSession;

//-------------------------------------------------------------------------------------------------------------------
