//local shortcuts

//third-party shortcuts

//standard shortcuts

//-------------------------------------------------------------------------------------------------------------------

mod support;

mod rtt;
mod session;

//-------------------------------------------------------------------------------------------------------------------
