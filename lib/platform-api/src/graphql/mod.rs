pub(crate) mod mutations;
pub mod proxy;

pub fn whoami_distro() -> String {
    whoami::distro().to_lowercase()
}
