mod subscription_tests;
