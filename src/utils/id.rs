/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/
/// Generates a short correlation identifier for one logical request.
///
/// The identifier is 12 characters of lowercase letters and digits produced
/// with `nanoid`. It is recorded on the request's tracing span so that all
/// attempts of the same call can be grouped in the logs.
///
/// # Examples
/// ```
/// use iplicit_client::utils::id::request_id;
/// let id = request_id();
/// assert_eq!(id.len(), 12);
/// ```
pub fn request_id() -> String {
    let alphabet: Vec<char> = "abcdefghijklmnopqrstuvwxyz0123456789".chars().collect();
    nanoid::nanoid!(12, &alphabet)
}
