fn main() -> anyhow::Result<()> {
	terraform_provider_keycloak_plugin::run()
}
